//! Configuration for every pipeline component.
//!
//! All tables that steer extraction, classification, transformation and
//! integrity checking live here as plain data. Components copy what they need
//! at construction; nothing reads configuration from global state.
//!
//! Every section is `#[serde(default)]`, so a TOML file only has to name the
//! values it overrides:
//!
//! ```toml
//! [extract]
//! region_selectors = ["article", ".markdown-body"]
//!
//! [metadata]
//! converted_for = "internal docs bot"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{ImageRule, LanguageRule, default_code_rules};
use crate::dom::Selector;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub classify: ClassifyConfig,
    pub transform: TransformConfig,
    pub metadata: MetadataConfig,
    pub integrity: IntegrityConfig,
}

impl Config {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Content region selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Tried in order; the first selector with a match picks the region.
    pub region_selectors: Vec<Selector>,
    /// Subtrees removed from the region before transformation.
    pub exclude_selectors: Vec<Selector>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            region_selectors: vec![
                Selector::Tag("main".into()),
                Selector::Attr {
                    name: "role".into(),
                    value: Some("main".into()),
                },
                Selector::Class("content".into()),
                Selector::Class("main-content".into()),
                Selector::Tag("article".into()),
                Selector::Class("docs-content".into()),
            ],
            exclude_selectors: vec![
                Selector::Tag("nav".into()),
                Selector::Tag("header".into()),
                Selector::Tag("footer".into()),
                Selector::Tag("aside".into()),
                Selector::Tag("script".into()),
                Selector::Tag("style".into()),
                Selector::Class("navigation".into()),
                Selector::Class("sidebar".into()),
            ],
        }
    }
}

/// Classifier rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub image_rules: Vec<ImageRule>,
    /// Prefix for descriptions built from alt text.
    pub image_alt_prefix: String,
    /// Description when neither a rule nor alt text applies.
    pub image_fallback: String,
    pub code_rules: Vec<LanguageRule>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            image_rules: vec![
                ImageRule::new(
                    &["terminal", "cli"],
                    "Terminal/CLI interface showing command execution and output",
                ),
                ImageRule::new(
                    &["admin", "dashboard"],
                    "Admin dashboard interface showing configuration options",
                ),
                ImageRule::new(
                    &["code", "editor"],
                    "Code editor interface showing file structure and code examples",
                ),
                ImageRule::new(
                    &["diagram"],
                    "Technical diagram illustrating system architecture or workflow",
                ),
            ],
            image_alt_prefix: "Interface screenshot: ".into(),
            image_fallback: "Documentation illustration showing relevant UI or workflow".into(),
            code_rules: default_code_rules(),
        }
    }
}

/// A callout class keyword and the label it renders with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutKind {
    pub keyword: String,
    pub label: String,
}

impl CalloutKind {
    pub fn new(keyword: &str, label: &str) -> Self {
        Self {
            keyword: keyword.into(),
            label: label.into(),
        }
    }
}

/// Node transformer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Substrings that mark a preceding sibling as a filename hint.
    pub filename_extensions: Vec<String>,
    /// Tags eligible to be treated as callouts.
    pub callout_tags: Vec<String>,
    /// Class keywords in priority order.
    pub callout_kinds: Vec<CalloutKind>,
    /// Label used when no keyword matches.
    pub default_callout_label: String,
    /// Run the integrity repair over every converted document.
    pub repair_output: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            filename_extensions: [".js", ".json", ".toml", ".md", ".tsx", ".jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            callout_tags: vec!["div".into(), "aside".into()],
            callout_kinds: vec![
                CalloutKind::new("warning", "⚠️ WARNING"),
                CalloutKind::new("caution", "⚠️ CAUTION"),
                CalloutKind::new("tip", "💡 TIP"),
                CalloutKind::new("info", "📝 NOTE"),
                CalloutKind::new("note", "📝 NOTE"),
            ],
            default_callout_label: "📝 NOTE".into(),
            repair_output: false,
        }
    }
}

/// Frontmatter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Value of the `converted_for` frontmatter key.
    pub converted_for: String,
    /// Emit the analysis block between frontmatter and body.
    pub include_analysis: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            converted_for: "AI coding assistant".into(),
            include_analysis: true,
        }
    }
}

/// A single box-drawing character and its ASCII replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReplacement {
    pub from: char,
    pub to: String,
}

/// Integrity checker tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Control characters that signal binary corruption.
    pub control_chars: Vec<char>,
    /// Regexes for corrupted folder-icon markers, checked in order.
    pub icon_patterns: Vec<String>,
    pub tree_replacements: Vec<TreeReplacement>,
    /// Path fragment that, with a code fence, marks a directory listing.
    pub directory_marker: String,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        let tree = [
            ('├', "|"),
            ('│', "|"),
            ('└', "+"),
            ('─', "-"),
            ('┌', "+"),
            ('┐', "+"),
            ('┘', "+"),
            ('┴', "+"),
        ];
        Self {
            control_chars: vec!['\x1c', '\x02', '\x14'],
            icon_patterns: vec![
                r"\*\*=\x{FFFD}[^*\n]*\*\*".into(),
                r"\*\*=\\ufffd[^*\n]*\*\*".into(),
                r"\*\*=[^📁\n][^*\n]*\*\*".into(),
            ],
            tree_replacements: tree
                .into_iter()
                .map(|(from, to)| TreeReplacement { from, to: to.into() })
                .collect(),
            directory_marker: "extensions/".into(),
        }
    }
}
