//! MCP Resources for the Image server.
//!
//! This module provides resource implementations for:
//! - `image://models` - List known Gemini image models
//! - `image://aspect_ratios` - List the aspect ratios `generate_image` accepts

use crate::handler::{AspectRatio, DEFAULT_MODEL};
use organon_mcp_common::models::ModelRegistry;
use serde::Serialize;

/// URI of the model list resource.
pub const MODELS_RESOURCE_URI: &str = "image://models";

/// URI of the aspect ratio list resource.
pub const ASPECT_RATIOS_RESOURCE_URI: &str = "image://aspect_ratios";

/// Information about a known image model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Model identifier
    pub id: &'static str,
    /// Model aliases
    pub aliases: Vec<&'static str>,
    /// Short description
    pub description: &'static str,
    /// Whether Vertex AI serves this model from the `global` location only
    pub global_only_on_vertex: bool,
    /// Whether this is the model used when none is configured
    pub is_default: bool,
}

/// Information about a supported aspect ratio.
#[derive(Debug, Clone, Serialize)]
pub struct AspectRatioInfo {
    /// Ratio token, e.g. `16:9`
    pub ratio: &'static str,
    /// Whether this ratio is used when none is given
    pub is_default: bool,
}

/// List all known image models.
pub fn list_models() -> Vec<ModelInfo> {
    ModelRegistry::list_image_models()
        .iter()
        .map(|m| ModelInfo {
            id: m.id,
            aliases: m.aliases.to_vec(),
            description: m.description,
            global_only_on_vertex: m.global_only_on_vertex,
            is_default: m.id == DEFAULT_MODEL,
        })
        .collect()
}

/// List all supported aspect ratios.
pub fn list_aspect_ratios() -> Vec<AspectRatioInfo> {
    AspectRatio::ALL
        .iter()
        .map(|r| AspectRatioInfo {
            ratio: r.as_str(),
            is_default: *r == AspectRatio::default(),
        })
        .collect()
}

/// Get models resource as JSON string.
pub fn models_resource_json() -> String {
    serde_json::to_string_pretty(&list_models()).unwrap_or_else(|_| "[]".to_string())
}

/// Get aspect ratios resource as JSON string.
pub fn aspect_ratios_resource_json() -> String {
    serde_json::to_string_pretty(&list_aspect_ratios()).unwrap_or_else(|_| "[]".to_string())
}

/// JSON body for `uri`, or `None` if the resource does not exist.
pub fn resource_json(uri: &str) -> Option<String> {
    match uri {
        MODELS_RESOURCE_URI => Some(models_resource_json()),
        ASPECT_RATIOS_RESOURCE_URI => Some(aspect_ratios_resource_json()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_models() {
        let models = list_models();
        let model_ids: Vec<&str> = models.iter().map(|m| m.id).collect();
        assert!(model_ids.contains(&"gemini-3-pro-image-preview"));
        assert!(model_ids.contains(&"gemini-2.5-flash-image"));
    }

    #[test]
    fn test_exactly_one_default_model() {
        let defaults: Vec<_> = list_models().into_iter().filter(|m| m.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, DEFAULT_MODEL);
    }

    #[test]
    fn test_list_aspect_ratios() {
        let ratios = list_aspect_ratios();
        assert_eq!(ratios.len(), 10);
        assert_eq!(ratios[0].ratio, "1:1");
        assert!(ratios[0].is_default);
        assert!(ratios[1..].iter().all(|r| !r.is_default));
    }

    #[test]
    fn test_models_resource_json() {
        let json: serde_json::Value = serde_json::from_str(&models_resource_json()).unwrap();
        let first = &json[0];
        assert!(first["aliases"].as_array().is_some());
        assert!(models_resource_json().contains("nano-banana"));
    }

    #[test]
    fn test_resource_json_lookup() {
        assert!(resource_json(MODELS_RESOURCE_URI).is_some());
        assert!(resource_json(ASPECT_RATIOS_RESOURCE_URI).unwrap().contains("21:9"));
        assert!(resource_json("image://providers").is_none());
    }
}
