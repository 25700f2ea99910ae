//! HTTP client for the Gemini `generateContent` API.
//!
//! One `GeminiClient` is built at start-up from the resolved [`Backend`] and
//! shared by every tool call. It owns the connection pool and the
//! credentials, and knows nothing about images: decoding the reply is the
//! handler's job.

use organon_mcp_common::auth::AuthProvider;
use organon_mcp_common::config::Backend;
use organon_mcp_common::error::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Header carrying the AI Studio API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

enum Credentials {
    ApiKey(String),
    Adc(AuthProvider),
}

/// Long-lived handle to the selected Gemini backend.
pub struct GeminiClient {
    http: reqwest::Client,
    backend: Backend,
    credentials: Credentials,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for `backend` against its public endpoint.
    ///
    /// # Errors
    /// Returns `AuthError::NotConfigured` for the Vertex AI backend when no
    /// Application Default Credentials can be found.
    pub async fn new(backend: Backend) -> Result<Self, Error> {
        let base_url = backend.default_base_url();
        Self::with_base_url(backend, base_url).await
    }

    /// Create a client for `backend` that sends requests to `base_url`
    /// instead of the public endpoint.
    ///
    /// # Errors
    /// Same as [`GeminiClient::new`].
    pub async fn with_base_url(backend: Backend, base_url: impl Into<String>) -> Result<Self, Error> {
        let credentials = match &backend {
            Backend::ApiKey { api_key } => Credentials::ApiKey(api_key.clone()),
            Backend::Vertex { .. } => Credentials::Adc(AuthProvider::new().await?),
        };
        Ok(Self::from_parts(backend, base_url.into(), credentials))
    }

    /// Create a client that takes Vertex AI bearer tokens from `auth`.
    ///
    /// An API-key backend keeps authenticating with its key and `auth` is
    /// not consulted.
    pub fn with_auth(backend: Backend, base_url: impl Into<String>, auth: AuthProvider) -> Self {
        let credentials = match &backend {
            Backend::ApiKey { api_key } => Credentials::ApiKey(api_key.clone()),
            Backend::Vertex { .. } => Credentials::Adc(auth),
        };
        Self::from_parts(backend, base_url.into(), credentials)
    }

    fn from_parts(backend: Backend, base_url: String, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The backend this client talks to.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Full `generateContent` URL for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}{}", self.base_url, self.backend.generate_content_path(model))
    }

    /// Issue one `generateContent` call.
    ///
    /// # Errors
    /// - `Error::Auth` if a Vertex AI token cannot be obtained
    /// - `Error::Api` on transport failure (status 0) or a non-success status
    /// - `Error::MalformedResponse` if the body is not a `generateContent` reply
    #[instrument(level = "debug", name = "generate_content", skip(self, request))]
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, Error> {
        let endpoint = self.endpoint(model);
        debug!(endpoint = %endpoint, "Calling Gemini API");

        let builder = self.http.post(&endpoint).json(request);
        let builder = match &self.credentials {
            Credentials::ApiKey(api_key) => builder.header(API_KEY_HEADER, api_key),
            Credentials::Adc(auth) => builder.bearer_auth(auth.cloud_platform_token().await?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(body) if !body.trim().is_empty() => api_error_message(&body),
                Ok(_) => canonical_reason(status),
                Err(e) => {
                    debug!(error = %e, "Failed to read error body");
                    canonical_reason(status)
                }
            };
            return Err(Error::api(&endpoint, status.as_u16(), message));
        }

        let response_text = response.text().await.map_err(|e| {
            Error::api(&endpoint, status.as_u16(), format!("Failed to read response: {}", e))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            debug!(response = %response_text, "Unparseable Gemini response");
            Error::malformed_response(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

fn canonical_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

/// Pull `error.message` out of a Google API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_string())
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// `generateContent` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns
    pub contents: Vec<GeminiContent>,
    /// Generation configuration
    pub generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    /// A single user turn asking for text and an image at `aspect_ratio`.
    pub fn text_to_image(prompt: impl Into<String>, aspect_ratio: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: prompt.into() }],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                image_config: Some(GeminiImageConfig {
                    aspect_ratio: aspect_ratio.into(),
                }),
            },
        }
    }
}

/// Request content turn.
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Role (user or model)
    pub role: String,
    /// Content parts
    pub parts: Vec<GeminiPart>,
}

/// Request part. Only text is ever sent.
#[derive(Debug, Serialize)]
pub struct GeminiPart {
    /// Text content
    pub text: String,
}

/// Generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Response modalities (TEXT, IMAGE)
    pub response_modalities: Vec<String>,
    /// Image configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<GeminiImageConfig>,
}

/// Image configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiImageConfig {
    /// Aspect ratio for generated images
    pub aspect_ratio: String,
}

/// `generateContent` response.
///
/// Every level is optional on the wire; the handler decides what a missing
/// level means.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Response candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Feedback on the prompt, present when it was blocked
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

/// Response candidate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Content
    #[serde(default)]
    pub content: Option<GeminiResponseContent>,
    /// Why generation stopped (e.g. STOP, SAFETY, IMAGE_SAFETY)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response content.
#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponseContent {
    /// Content parts
    #[serde(default)]
    pub parts: Option<Vec<GeminiResponsePart>>,
}

/// Raw response part. Text, inline data, or neither (e.g. a bare thought signature).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponsePart {
    /// Text content
    #[serde(default)]
    pub text: Option<String>,
    /// Inline binary payload
    #[serde(default)]
    pub inline_data: Option<GeminiInlineData>,
    /// Marks intermediate reasoning output
    #[serde(default)]
    pub thought: bool,
}

/// Inline data (base64 encoded).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    /// MIME type
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64-encoded data
    #[serde(default)]
    pub data: String,
}

/// Prompt feedback.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    /// Reason the prompt was blocked
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human-readable explanation of the block
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
}
