//! Property-based tests for backend resolution.
//!
//! Every test resolves against an in-memory variable map through
//! `Config::from_lookup`, so no process environment is touched.

use std::collections::HashMap;

use proptest::prelude::*;

use crate::config::{
    API_KEY_VAR, Backend, Config, DEFAULT_LOCATION, LOCATION_VAR, MODEL_VAR, PROJECT_VAR,
};
use crate::error::ConfigError;

fn resolve(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| map.get(name).cloned())
}

/// Strategy for API keys (non-empty, no whitespace)
fn api_key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{8,40}"
}

/// Strategy for GCP project IDs
fn project_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{5,28}[a-z0-9]"
}

/// Strategy for Vertex AI locations
fn location_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-central1".to_string()),
        Just("us-east4".to_string()),
        Just("europe-west4".to_string()),
        Just("asia-northeast1".to_string()),
        Just("global".to_string()),
    ]
}

proptest! {
    /// Only the key variable set resolves to the key-based backend with that key.
    #[test]
    fn key_only_resolves_to_api_key_backend(key in api_key_strategy()) {
        let config = resolve(&[(API_KEY_VAR, &key)]).unwrap();
        prop_assert_eq!(config.backend, Backend::ApiKey { api_key: key });
    }

    /// Only the project variable set resolves to Vertex with the default region.
    #[test]
    fn project_only_uses_default_location(project in project_strategy()) {
        let config = resolve(&[(PROJECT_VAR, &project)]).unwrap();
        prop_assert_eq!(
            config.backend,
            Backend::Vertex { project, location: DEFAULT_LOCATION.to_string() }
        );
    }

    /// A location override is honored verbatim.
    #[test]
    fn project_with_location_override(
        project in project_strategy(),
        location in location_strategy(),
    ) {
        let config = resolve(&[(PROJECT_VAR, &project), (LOCATION_VAR, &location)]).unwrap();
        prop_assert_eq!(config.backend, Backend::Vertex { project, location });
    }

    /// The key-based backend wins when both are configured.
    #[test]
    fn api_key_takes_precedence(
        key in api_key_strategy(),
        project in project_strategy(),
        location in location_strategy(),
    ) {
        let config = resolve(&[
            (API_KEY_VAR, &key),
            (PROJECT_VAR, &project),
            (LOCATION_VAR, &location),
        ]).unwrap();
        prop_assert!(config.backend.is_api_key());
    }

    /// Without either credential, resolution fails naming both alternatives,
    /// whatever else is set.
    #[test]
    fn missing_credentials_names_both(
        location in prop::option::of(location_strategy()),
        model in prop::option::of("[a-z0-9.-]{3,30}"),
    ) {
        let mut vars: Vec<(&str, &str)> = Vec::new();
        if let Some(ref l) = location {
            vars.push((LOCATION_VAR, l));
        }
        if let Some(ref m) = model {
            vars.push((MODEL_VAR, m));
        }

        let err = resolve(&vars).unwrap_err();
        let msg = err.to_string();
        prop_assert!(msg.contains(API_KEY_VAR), "missing {}: {}", API_KEY_VAR, msg);
        prop_assert!(msg.contains(PROJECT_VAR), "missing {}: {}", PROJECT_VAR, msg);
    }
}

#[cfg(test)]
mod config_logic_tests {
    use super::*;

    #[test]
    fn empty_values_count_as_unset() {
        let err = resolve(&[(API_KEY_VAR, ""), (PROJECT_VAR, "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn empty_api_key_falls_through_to_vertex() {
        let config = resolve(&[(API_KEY_VAR, ""), (PROJECT_VAR, "my-project")]).unwrap();
        assert!(config.backend.is_vertex());
    }

    #[test]
    fn empty_location_uses_default() {
        let config = resolve(&[(PROJECT_VAR, "my-project"), (LOCATION_VAR, "")]).unwrap();
        assert_eq!(
            config.backend,
            Backend::Vertex {
                project: "my-project".to_string(),
                location: "us-central1".to_string(),
            }
        );
    }

    #[test]
    fn invalid_location_is_rejected() {
        let err = resolve(&[(PROJECT_VAR, "my-project"), (LOCATION_VAR, "evil.com/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == LOCATION_VAR));
    }

    #[test]
    fn default_model_from_env() {
        let config = resolve(&[(API_KEY_VAR, "k"), (MODEL_VAR, "gemini-2.5-flash-image")]).unwrap();
        assert_eq!(config.default_model.as_deref(), Some("gemini-2.5-flash-image"));

        let config = resolve(&[(API_KEY_VAR, "k")]).unwrap();
        assert!(config.default_model.is_none());
    }

    #[test]
    fn api_key_endpoint() {
        let backend = Backend::ApiKey { api_key: "k".to_string() };
        assert_eq!(
            backend.generate_content_endpoint("gemini-3-pro-image-preview"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
    }

    #[test]
    fn vertex_regional_endpoint() {
        let backend = Backend::Vertex {
            project: "my-project".to_string(),
            location: "us-west1".to_string(),
        };
        assert_eq!(
            backend.generate_content_endpoint("gemini-2.5-flash-image"),
            "https://us-west1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-west1/publishers/google/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn vertex_global_endpoint_has_no_region_prefix() {
        let backend = Backend::Vertex {
            project: "p".to_string(),
            location: "global".to_string(),
        };
        assert_eq!(backend.default_base_url(), "https://aiplatform.googleapis.com");
        assert!(backend.generate_content_path("m").contains("/locations/global/"));
    }

    #[test]
    fn describe_backends() {
        let key = Backend::ApiKey { api_key: "secret".to_string() };
        assert_eq!(key.describe(), "AI Studio");

        let vertex = Backend::Vertex {
            project: "p".to_string(),
            location: "asia-northeast1".to_string(),
        };
        assert_eq!(vertex.describe(), "Vertex AI (p / asia-northeast1)");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = resolve(&[(API_KEY_VAR, "super-secret-key")]).unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key"));
        assert!(debug_output.contains("redacted"));
    }
}
