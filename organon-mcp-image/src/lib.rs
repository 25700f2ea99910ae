//! Organon MCP Image Server Library
//!
//! Text-to-image generation with Gemini image models, reachable through either
//! Google AI Studio (API key) or Vertex AI (Application Default Credentials).

pub mod client;
pub mod handler;
pub mod resources;
pub mod server;

pub use client::GeminiClient;
pub use handler::{AspectRatio, GeneratedImage, ImageGenerator, ImageHandler, ImageRequest};
pub use server::{GenerateImageToolParams, ImageServer};
