//! Engine settings.

use serde::{Deserialize, Serialize};

/// Display name of the character style that marks template tags.
pub const DEFAULT_TAG_STYLE: &str = "TemplateTag";

/// Highlight color applied to tag delimiters in draft and partial output.
pub const DEFAULT_HIGHLIGHT: &str = "yellow";

/// Label used by `currency_to_words` when spelling is skipped.
pub const DEFAULT_SPELLED_LABEL: &str = "Spelled";

/// Settings shared by every render performed through an [`Engine`](crate::Engine).
///
/// All fields have defaults, so an empty table deserializes to
/// [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the style (display name or id) carried by tag runs.
    pub tag_style: String,
    /// WordprocessingML highlight color name.
    pub highlight: String,
    /// Prefix of the placeholder returned when currency spelling is skipped.
    pub spelled_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tag_style: DEFAULT_TAG_STYLE.to_string(),
            highlight: DEFAULT_HIGHLIGHT.to_string(),
            spelled_label: DEFAULT_SPELLED_LABEL.to_string(),
        }
    }
}
