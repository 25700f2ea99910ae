//! Organon MCP Common Library
//!
//! Shared building blocks for the Organon image MCP server: backend
//! configuration, the error hierarchy, Application Default Credentials,
//! the Gemini image model registry, tracing setup, and the MCP server runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod error_test;
#[cfg(test)]
mod server_test;

pub use config::{Backend, Config};
pub use error::{AuthError, ConfigError, Error, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};
