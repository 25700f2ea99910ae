//! Configuration module for resolving the Gemini backend from the environment.

use std::fmt;

use crate::error::ConfigError;

/// Enables the Google AI Studio backend.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Enables the Vertex AI backend.
pub const PROJECT_VAR: &str = "VERTEX_PROJECT";

/// Overrides the Vertex AI region.
pub const LOCATION_VAR: &str = "VERTEX_LOCATION";

/// Overrides the default image model.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

/// Vertex AI region used when `VERTEX_LOCATION` is unset.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Google AI Studio REST host.
pub const AI_STUDIO_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Remote service configuration used to reach the Gemini image models.
#[derive(Clone, PartialEq, Eq)]
pub enum Backend {
    /// Google AI Studio, authenticated with an API key.
    ApiKey {
        /// AI Studio API key
        api_key: String,
    },
    /// Vertex AI, authenticated with Application Default Credentials.
    Vertex {
        /// Google Cloud project ID
        project: String,
        /// Google Cloud region, or `global`
        location: String,
    },
}

impl Backend {
    /// Human-readable label for logs.
    pub fn describe(&self) -> String {
        match self {
            Backend::ApiKey { .. } => "AI Studio".to_string(),
            Backend::Vertex { project, location } => {
                format!("Vertex AI ({} / {})", project, location)
            }
        }
    }

    /// Check if this is the API-key backend.
    pub fn is_api_key(&self) -> bool {
        matches!(self, Backend::ApiKey { .. })
    }

    /// Check if this is the Vertex AI backend.
    pub fn is_vertex(&self) -> bool {
        matches!(self, Backend::Vertex { .. })
    }

    /// Scheme and host of the REST API for this backend.
    ///
    /// The Vertex `global` location has no regional host prefix.
    pub fn default_base_url(&self) -> String {
        match self {
            Backend::ApiKey { .. } => AI_STUDIO_BASE_URL.to_string(),
            Backend::Vertex { location, .. } if location == "global" => {
                "https://aiplatform.googleapis.com".to_string()
            }
            Backend::Vertex { location, .. } => {
                format!("https://{}-aiplatform.googleapis.com", location)
            }
        }
    }

    /// Path of the `generateContent` method for `model`, relative to the base URL.
    pub fn generate_content_path(&self, model: &str) -> String {
        match self {
            Backend::ApiKey { .. } => format!("/v1beta/models/{}:generateContent", model),
            Backend::Vertex { project, location } => format!(
                "/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                project, location, model
            ),
        }
    }

    /// Full `generateContent` URL for `model` against the default host.
    pub fn generate_content_endpoint(&self, model: &str) -> String {
        format!("{}{}", self.default_base_url(), self.generate_content_path(model))
    }
}

// The API key must never reach the logs.
impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::ApiKey { .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"<redacted>")
                .finish(),
            Backend::Vertex { project, location } => f
                .debug_struct("Vertex")
                .field("project", project)
                .field("location", location)
                .finish(),
        }
    }
}

/// Application configuration, resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Selected backend
    pub backend: Backend,
    /// Model used when a call does not name one (`GEMINI_MODEL`)
    pub default_model: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingCredentials` if neither `GEMINI_API_KEY`
    /// nor `VERTEX_PROJECT` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset. The API key wins when
    /// both backends are configured.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let backend = if let Some(api_key) = get(API_KEY_VAR) {
            Backend::ApiKey { api_key }
        } else if let Some(project) = get(PROJECT_VAR) {
            let location = get(LOCATION_VAR).unwrap_or_else(|| DEFAULT_LOCATION.to_string());
            if location.contains(['/', ':']) || location.contains(char::is_whitespace) {
                return Err(ConfigError::invalid_value(
                    LOCATION_VAR,
                    format!("'{}' is not a region name", location),
                ));
            }
            Backend::Vertex { project, location }
        } else {
            return Err(ConfigError::MissingCredentials {
                api_key_var: API_KEY_VAR,
                project_var: PROJECT_VAR,
            });
        };

        Ok(Self {
            backend,
            default_model: get(MODEL_VAR),
        })
    }
}
