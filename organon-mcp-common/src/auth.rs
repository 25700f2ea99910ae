//! Application Default Credentials for the Vertex AI backend.
//!
//! The API-key backend needs nothing from this module. Vertex AI requests carry
//! an OAuth2 bearer token discovered through ADC:
//! - a service account file named by `GOOGLE_APPLICATION_CREDENTIALS`
//! - user credentials from `gcloud auth application-default login`
//! - the GCE metadata server
//! - the gcloud CLI

use std::sync::Arc;

use gcp_auth::TokenProvider;
use tracing::{debug, instrument};

use crate::error::AuthError;

/// OAuth2 scope required by Vertex AI `generateContent`.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

enum TokenSource {
    Provider(Arc<dyn TokenProvider>),
    #[cfg(any(test, feature = "test-util"))]
    Static(String),
}

/// Bearer-token source backed by `gcp_auth`.
///
/// Tokens are cached and refreshed by `gcp_auth`; callers should ask for a
/// token on every request rather than holding on to one.
pub struct AuthProvider {
    source: TokenSource,
}

impl AuthProvider {
    /// Discover Application Default Credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` if no credentials can be found.
    #[instrument(level = "debug", name = "auth_provider_new")]
    pub async fn new() -> Result<Self, AuthError> {
        debug!("Initializing AuthProvider with ADC");

        let provider = gcp_auth::provider().await.map_err(|e| {
            debug!("Failed to initialize ADC: {}", e);
            AuthError::NotConfigured
        })?;

        Ok(Self {
            source: TokenSource::Provider(provider),
        })
    }

    /// A provider that always hands out `token`, for tests.
    #[cfg(any(test, feature = "test-util"))]
    pub fn mock(token: &str) -> Self {
        Self {
            source: TokenSource::Static(token.to_string()),
        }
    }

    /// Get an access token for the cloud-platform scope.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshFailed` if the token cannot be obtained.
    #[instrument(level = "debug", name = "get_token", skip(self))]
    pub async fn cloud_platform_token(&self) -> Result<String, AuthError> {
        match &self.source {
            TokenSource::Provider(provider) => {
                let token = provider
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| AuthError::refresh_failed(e.to_string()))?;
                Ok(token.as_str().to_string())
            }
            #[cfg(any(test, feature = "test-util"))]
            TokenSource::Static(token) => Ok(token.clone()),
        }
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProvider").finish_non_exhaustive()
    }
}
