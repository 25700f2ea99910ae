//! MCP Server implementation for the Image server.
//!
//! This module provides the MCP server handler that exposes:
//! - `generate_image` tool for text-to-image generation
//! - Resources for models and aspect ratios

use crate::handler::{AspectRatio, GeneratedImage, ImageGenerator, ImageRequest};
use crate::resources::{self, ASPECT_RATIOS_RESOURCE_URI, MODELS_RESOURCE_URI};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use organon_mcp_common::error::Error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolResult, Content, Implementation, JsonObject, ListResourcesResult,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo, Tool,
    },
};
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the single tool this server registers.
pub const GENERATE_IMAGE_TOOL: &str = "generate_image";

/// Tool parameters for generate_image.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateImageToolParams {
    /// Text prompt for image generation. English recommended. More specific and detailed prompts yield better results.
    pub prompt: String,

    /// Aspect ratio of the output image. Default: 1:1.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// File path to save the generated image (.png). Example: /home/me/Pictures/output.png
    pub output_path: String,

    /// Gemini model name for image generation. Default: gemini-3-pro-image-preview. Example: gemini-2.5-flash-image
    #[serde(default)]
    pub model: Option<String>,
}

/// Validation error details for tool parameters.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl GenerateImageToolParams {
    /// Decode raw call arguments.
    ///
    /// # Errors
    /// Returns `invalid_params` when arguments are absent, a required field is
    /// missing, or a value is outside its allowed set.
    pub fn from_arguments(arguments: Option<JsonObject>) -> Result<Self, McpError> {
        arguments
            .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
            .transpose()
            .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))?
            .ok_or_else(|| McpError::invalid_params("Missing parameters", None))
    }

    /// Check the values that decoding alone cannot.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Prompt cannot be empty".to_string(),
            });
        }

        if self.output_path.trim().is_empty() {
            errors.push(ValidationError {
                field: "output_path".to_string(),
                message: "Output path cannot be empty".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn to_request(&self) -> ImageRequest {
        ImageRequest {
            prompt: self.prompt.clone(),
            aspect_ratio: self.aspect_ratio,
            model: self.model.clone(),
        }
    }
}

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    generator: Arc<dyn ImageGenerator>,
}

impl ImageServer {
    /// Create a server backed by `generator`.
    pub fn new(generator: impl ImageGenerator + 'static) -> Self {
        Self::from_arc(Arc::new(generator))
    }

    /// Create a server sharing an existing generator.
    pub fn from_arc(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    /// The tools this server registers.
    pub fn tools() -> Vec<Tool> {
        let schema = SchemaSettings::draft07()
            .with(|s| {
                s.inline_subschemas = true;
                s.option_add_null_type = false;
            })
            .into_generator()
            .into_root_schema_for::<GenerateImageToolParams>();

        let input_schema = match serde_json::to_value(&schema).unwrap_or_default() {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };

        vec![Tool {
            name: Cow::Borrowed(GENERATE_IMAGE_TOOL),
            description: Some(Cow::Borrowed(
                "Generate an image from a text prompt using Gemini. \
                 The image is saved to the specified file path and also returned inline. \
                 Supports various aspect ratios.",
            )),
            input_schema,
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: Some("Generate Image".to_string()),
        }]
    }

    /// Run one `generate_image` call.
    ///
    /// Failures never escape as protocol errors: they come back as a single
    /// text item with `is_error` set.
    #[instrument(level = "info", name = "generate_image_tool", skip(self, params), fields(output_path = %params.output_path))]
    pub async fn generate_image(&self, params: GenerateImageToolParams) -> CallToolResult {
        match self.save_generated_image(&params).await {
            Ok(content) => CallToolResult::success(content),
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                CallToolResult::error(vec![Content::text(format!("Image generation failed: {}", e))])
            }
        }
    }

    async fn save_generated_image(&self, params: &GenerateImageToolParams) -> Result<Vec<Content>, Error> {
        params.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        if let Some(parent) = Path::new(&params.output_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error_at("Failed to create directory", parent, e))?;
            }
        }

        let image = self.generator.generate_image(&params.to_request()).await?;

        let bytes = BASE64
            .decode(&image.data)
            .map_err(|e| Error::malformed_response(format!("Invalid base64 image data: {}", e)))?;
        tokio::fs::write(&params.output_path, &bytes)
            .await
            .map_err(|e| io_error_at("Failed to write", Path::new(&params.output_path), e))?;

        info!(path = %params.output_path, bytes = bytes.len(), "Saved generated image");

        Ok(response_content(params, image))
    }
}

/// Keep the I/O error kind but name the path it happened on.
fn io_error_at(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!("{} {}: {}", action, path.display(), err),
    ))
}

fn response_content(params: &GenerateImageToolParams, image: GeneratedImage) -> Vec<Content> {
    let mut lines = vec![
        format!("Image generated and saved to: {}", params.output_path),
        format!("Prompt: {}", params.prompt),
        format!("Aspect ratio: {}", params.aspect_ratio),
    ];
    if let Some(text) = image.text.as_deref() {
        lines.push(format!("Model note: {}", text));
    }

    vec![
        Content::text(lines.join("\n")),
        Content::image(image.data, image.mime_type),
    ]
}

fn json_resource(uri: &str, name: &str, description: &str) -> rmcp::model::Resource {
    rmcp::model::Resource {
        raw: rmcp::model::RawResource {
            uri: uri.to_string(),
            name: name.to_string(),
            title: None,
            description: Some(description.to_string()),
            mime_type: Some("application/json".to_string()),
            size: None,
            icons: None,
            meta: None,
        },
        annotations: None,
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::default();
        server_info.name = "organon-create-image".to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            instructions: Some(
                "Image generation server using Gemini image models via Google AI Studio or Vertex AI. \
                 Use generate_image to create an image from a text prompt; the image is written \
                 to output_path and returned inline."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info,
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_ {
        async move {
            Ok(rmcp::model::ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                GENERATE_IMAGE_TOOL => {
                    let tool_params = GenerateImageToolParams::from_arguments(params.arguments)?;
                    Ok(self.generate_image(tool_params).await)
                }
                _ => Err(McpError::invalid_params(format!("Unknown tool: {}", params.name), None)),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            Ok(ListResourcesResult {
                resources: vec![
                    json_resource(
                        MODELS_RESOURCE_URI,
                        "Available Image Models",
                        "Gemini image models with their aliases",
                    ),
                    json_resource(
                        ASPECT_RATIOS_RESOURCE_URI,
                        "Supported Aspect Ratios",
                        "Aspect ratios accepted by generate_image",
                    ),
                ],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = resources::resource_json(uri).ok_or_else(|| {
                McpError::resource_not_found(format!("Unknown resource: {}", uri), None)
            })?;

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}
