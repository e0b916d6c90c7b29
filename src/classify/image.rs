//! Image description heuristics.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::config::ClassifyConfig;

/// A ranked keyword rule: if any keyword occurs in the image source, the
/// image gets this description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRule {
    pub keywords: Vec<String>,
    pub description: String,
}

impl ImageRule {
    pub fn new(keywords: &[&str], description: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: description.to_string(),
        }
    }

    /// `src` must already be lowercased.
    fn matches(&self, src: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| src.contains(k.to_lowercase().as_str()))
    }
}

/// First-match-wins image classifier.
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    rules: Vec<ImageRule>,
    alt_prefix: String,
    fallback: String,
}

impl ImageClassifier {
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            rules: config.image_rules.clone(),
            alt_prefix: config.image_alt_prefix.clone(),
            fallback: config.image_fallback.clone(),
        }
    }

    /// Describe an image from its source URL and alt text.
    ///
    /// Never fails and never returns an empty string: source keywords win,
    /// then the alt text, then the generic fallback.
    pub fn classify(&self, src: &str, alt: &str) -> String {
        let src = src.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&src)) {
            return rule.description.clone();
        }

        let alt = alt.trim();
        if alt.is_empty() {
            self.fallback.clone()
        } else {
            format!("{}{}", self.alt_prefix, alt)
        }
    }
}

impl Default for ImageClassifier {
    fn default() -> Self {
        Self::new(&ClassifyConfig::default())
    }
}

static DEFAULT_CLASSIFIER: LazyLock<ImageClassifier> = LazyLock::new(ImageClassifier::default);

/// Describe an image using the built-in rule table.
pub fn classify_image(src: &str, alt: &str) -> String {
    DEFAULT_CLASSIFIER.classify(src, alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_rules() {
        assert!(classify_image("/img/terminal-output.png", "").starts_with("Terminal/CLI"));
        assert!(classify_image("/img/CLI_run.png", "").starts_with("Terminal/CLI"));
        assert!(classify_image("/assets/Dashboard.png", "").starts_with("Admin dashboard"));
        assert!(classify_image("/assets/editor.png", "").starts_with("Code editor"));
        assert!(classify_image("/assets/flow-diagram.svg", "").starts_with("Technical diagram"));
    }

    #[test]
    fn test_first_rule_wins() {
        // "cli" and "dashboard" both match; the terminal rule is ranked first.
        let desc = classify_image("/cli-dashboard.png", "ignored");
        assert_eq!(desc, classify_image("/terminal.png", ""));
    }

    #[test]
    fn test_alt_fallback() {
        assert_eq!(
            classify_image("/static/photo.png", "  Checkout page  "),
            "Interface screenshot: Checkout page"
        );
    }

    #[test]
    fn test_generic_fallback() {
        let desc = classify_image("", "");
        assert_eq!(desc, "Documentation illustration showing relevant UI or workflow");
        assert_eq!(classify_image("/x.png", "   "), desc);
    }

    #[test]
    fn test_custom_rules() {
        let config = ClassifyConfig {
            image_rules: vec![ImageRule::new(&["Chart"], "A chart")],
            ..ClassifyConfig::default()
        };
        let classifier = ImageClassifier::new(&config);
        assert_eq!(classifier.classify("/sales-chart.png", ""), "A chart");
        assert_ne!(classifier.classify("/terminal.png", ""), "A chart");
    }
}
