//! Gemini image model definitions and registry.
//!
//! The registry is advisory: names it does not know are passed to the API
//! unchanged, so newly released models work without a code change.

use serde::Serialize;

/// Gemini image-capable model definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeminiImageModel {
    /// Full model identifier
    pub id: &'static str,
    /// Model aliases for convenience
    pub aliases: &'static [&'static str],
    /// Short description for clients
    pub description: &'static str,
    /// Whether the model is available on the Vertex AI `global` location only
    pub global_only_on_vertex: bool,
}

/// Gemini 3 Pro Image (preview)
pub const GEMINI_3_PRO_IMAGE_PREVIEW: GeminiImageModel = GeminiImageModel {
    id: "gemini-3-pro-image-preview",
    aliases: &["nano-banana-pro", "gemini-3-pro-image"],
    description: "Highest quality image generation and editing, with reasoning",
    global_only_on_vertex: true,
};

/// Gemini 2.5 Flash Image
pub const GEMINI_2_5_FLASH_IMAGE: GeminiImageModel = GeminiImageModel {
    id: "gemini-2.5-flash-image",
    aliases: &["nano-banana", "gemini-2.5-flash-image-preview"],
    description: "Fast, low-latency image generation",
    global_only_on_vertex: false,
};

/// All known Gemini image models
pub const GEMINI_IMAGE_MODELS: &[GeminiImageModel] =
    &[GEMINI_3_PRO_IMAGE_PREVIEW, GEMINI_2_5_FLASH_IMAGE];

/// Model registry for resolving names and aliases.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Resolve a model id or alias (case-insensitive).
    ///
    /// # Example
    ///
    /// ```
    /// use organon_mcp_common::models::ModelRegistry;
    ///
    /// let model = ModelRegistry::resolve_image_model("nano-banana").unwrap();
    /// assert_eq!(model.id, "gemini-2.5-flash-image");
    /// ```
    pub fn resolve_image_model(name: &str) -> Option<&'static GeminiImageModel> {
        let name = name.trim();
        GEMINI_IMAGE_MODELS.iter().find(|m| {
            m.id.eq_ignore_ascii_case(name) || m.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// The canonical id for `name`, or `name` itself when unknown.
    pub fn canonical_image_model_id(name: &str) -> &str {
        Self::resolve_image_model(name).map(|m| m.id).unwrap_or(name)
    }

    /// List all known image models.
    pub fn list_image_models() -> &'static [GeminiImageModel] {
        GEMINI_IMAGE_MODELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_id() {
        let model = ModelRegistry::resolve_image_model("gemini-3-pro-image-preview").unwrap();
        assert_eq!(model.id, "gemini-3-pro-image-preview");
    }

    #[test]
    fn test_resolve_by_alias_case_insensitive() {
        let model = ModelRegistry::resolve_image_model("Nano-Banana-Pro").unwrap();
        assert_eq!(model.id, "gemini-3-pro-image-preview");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(ModelRegistry::resolve_image_model("imagen-4.0-generate-001").is_none());
    }

    #[test]
    fn test_canonical_id_passes_unknown_through() {
        assert_eq!(ModelRegistry::canonical_image_model_id("custom-model"), "custom-model");
        assert_eq!(
            ModelRegistry::canonical_image_model_id("nano-banana"),
            "gemini-2.5-flash-image"
        );
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut names: Vec<&str> = GEMINI_IMAGE_MODELS
            .iter()
            .flat_map(|m| std::iter::once(m.id).chain(m.aliases.iter().copied()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
