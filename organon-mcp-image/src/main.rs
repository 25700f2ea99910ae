//! Organon MCP Image Server
//!
//! MCP server for image generation using Gemini via Google AI Studio or Vertex AI.

use anyhow::Result;
use clap::Parser;
use organon_mcp_common::tracing::init_tracing;
use organon_mcp_common::{Config, McpServerBuilder, TransportArgs};
use organon_mcp_image::{GeminiClient, ImageHandler, ImageServer};

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "organon-mcp-image", version)]
#[command(about = "MCP server for image generation using Gemini")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("organon-mcp-image server starting...");

    // Loads .env as well, so it must run before flags read PORT
    let config = Config::from_env()?;
    let args = Args::parse();

    tracing::info!(
        backend = %config.backend.describe(),
        default_model = config.default_model.as_deref().unwrap_or(organon_mcp_image::handler::DEFAULT_MODEL),
        "Configuration loaded"
    );

    let client = GeminiClient::new(config.backend).await?;
    let handler = ImageHandler::new(client, config.default_model);
    let server = ImageServer::new(handler);

    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
