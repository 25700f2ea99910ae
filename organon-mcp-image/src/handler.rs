//! Image generation handler for the MCP Image server.
//!
//! This module provides the `ImageGenerator` trait the tool front-end depends
//! on, and `ImageHandler`, its Gemini-backed implementation. The handler
//! resolves the model, issues one `generateContent` call and turns the reply
//! into a [`GeneratedImage`] or a typed error.

use crate::client::{GeminiClient, GeminiRequest, GeminiResponse};
use async_trait::async_trait;
use organon_mcp_common::config::Backend;
use organon_mcp_common::error::Error;
use organon_mcp_common::models::ModelRegistry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// Default model for image generation.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

/// MIME type assumed when the API omits one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Message for a reply that carries no usable parts.
pub const NO_PARTS_MESSAGE: &str = "No response parts from Gemini API";

/// Message for a reply that carries parts but no image.
pub const NO_IMAGE_MESSAGE: &str = "No image data in Gemini response. The model may have refused to generate the image due to safety filters.";

/// Aspect ratio of the generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
}

impl AspectRatio {
    /// Every supported ratio, in the order clients see them.
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait2x3,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Ultrawide21x9,
    ];

    /// The wire token, e.g. `"16:9"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == token)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|r| r.as_str()).collect();
                Error::validation(format!(
                    "Invalid aspect ratio '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// One image generation request, as seen by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Text prompt describing the image
    pub prompt: String,
    /// Aspect ratio of the output
    pub aspect_ratio: AspectRatio,
    /// Model id or alias; `None` uses the configured default
    pub model: Option<String>,
}

impl ImageRequest {
    /// Request with the default aspect ratio and model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            model: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded image data
    pub data: String,
    /// MIME type of the image
    pub mime_type: String,
    /// Caption the model returned alongside the image
    pub text: Option<String>,
}

/// A decoded response part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// Parts of the first candidate, with the reason generation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResponse {
    pub parts: Vec<ResponsePart>,
    pub finish_reason: Option<String>,
}

/// Decode the first candidate of a `generateContent` reply.
///
/// Thought parts and parts with neither text nor data are dropped.
///
/// # Errors
/// - `Error::ContentRefused` if the prompt was blocked
/// - `Error::MalformedResponse` if there is no candidate, content or part
pub fn decode_response(response: GeminiResponse) -> Result<DecodedResponse, Error> {
    let block_reason = response.prompt_feedback.and_then(|feedback| {
        feedback.block_reason.map(|reason| match feedback.block_reason_message {
            Some(message) => format!("{} ({})", reason, message),
            None => reason,
        })
    });

    let candidate = response.candidates.into_iter().next();
    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
    let raw_parts = candidate
        .and_then(|c| c.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();

    if raw_parts.is_empty() {
        return Err(match block_reason {
            Some(reason) => Error::content_refused(format!("Prompt blocked by Gemini: {}", reason)),
            None => Error::malformed_response(NO_PARTS_MESSAGE),
        });
    }

    let parts = raw_parts
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| {
            if let Some(inline) = part.inline_data {
                if !inline.data.is_empty() {
                    return Some(ResponsePart::InlineData {
                        mime_type: inline
                            .mime_type
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                        data: inline.data,
                    });
                }
            }
            part.text
                .filter(|text| !text.is_empty())
                .map(ResponsePart::Text)
        })
        .collect();

    Ok(DecodedResponse {
        parts,
        finish_reason,
    })
}

/// Pick the image and caption out of decoded parts.
///
/// The last image part and the last text part win.
///
/// # Errors
/// Returns `Error::ContentRefused` when no part carries image data.
pub fn extract_image(decoded: DecodedResponse) -> Result<GeneratedImage, Error> {
    let mut image: Option<(String, String)> = None;
    let mut text: Option<String> = None;

    for part in decoded.parts {
        match part {
            ResponsePart::Text(t) => text = Some(t),
            ResponsePart::InlineData { mime_type, data } => image = Some((data, mime_type)),
        }
    }

    match image {
        Some((data, mime_type)) => Ok(GeneratedImage {
            data,
            mime_type,
            text,
        }),
        None => Err(Error::content_refused(match decoded.finish_reason {
            Some(reason) => format!("{} (finish reason: {})", NO_IMAGE_MESSAGE, reason),
            None => NO_IMAGE_MESSAGE.to_string(),
        })),
    }
}

/// Something that can turn a prompt into an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage, Error>;
}

/// Gemini-backed image generator.
pub struct ImageHandler {
    client: GeminiClient,
    default_model: String,
}

impl ImageHandler {
    /// Create a handler; `default_model` falls back to [`DEFAULT_MODEL`].
    pub fn new(client: GeminiClient, default_model: Option<String>) -> Self {
        Self {
            client,
            default_model: default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Canonical model id for a request: per-call model, then the default.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        let name = requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());
        ModelRegistry::canonical_image_model_id(name).to_string()
    }

    fn warn_if_regional(&self, model: &str) {
        if let Backend::Vertex { location, .. } = self.client.backend() {
            let global_only = ModelRegistry::resolve_image_model(model)
                .is_some_and(|m| m.global_only_on_vertex);
            if global_only && location != "global" {
                warn!(
                    model,
                    location = %location,
                    "Model is only served from the global Vertex AI location; set VERTEX_LOCATION=global if the call fails"
                );
            }
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageHandler {
    #[instrument(level = "info", name = "generate_image", skip(self, request), fields(aspect_ratio = %request.aspect_ratio))]
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage, Error> {
        let model = self.resolve_model(request.model.as_deref());
        self.warn_if_regional(&model);

        info!(model = %model, backend = %self.client.backend().describe(), "Generating image with Gemini");

        let api_request = GeminiRequest::text_to_image(&request.prompt, request.aspect_ratio.as_str());
        let response = self.client.generate_content(&model, &api_request).await?;

        let decoded = decode_response(response)?;
        debug!(parts = decoded.parts.len(), "Decoded Gemini response");

        let image = extract_image(decoded)?;
        info!(mime_type = %image.mime_type, has_caption = image.text.is_some(), "Received image from Gemini");
        Ok(image)
    }
}
