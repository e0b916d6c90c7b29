//! Code language heuristics.
//!
//! A language tag is a best-effort guess, not a parse. Rules are tried in
//! order and the first one whose cue holds decides the tag.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::config::ClassifyConfig;

/// A textual cue evaluated against a code fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// The trimmed text starts with one of the prefixes.
    StartsWith(Vec<String>),
    /// The text contains the substring.
    Contains(String),
    /// The text contains the substring, ignoring ASCII case.
    ContainsIgnoreCase(String),
    All(Vec<Cue>),
    Any(Vec<Cue>),
}

impl Cue {
    pub fn starts_with(prefixes: &[&str]) -> Self {
        Cue::StartsWith(prefixes.iter().map(|p| p.to_string()).collect())
    }

    pub fn contains(needle: &str) -> Self {
        Cue::Contains(needle.to_string())
    }

    pub fn contains_ignore_case(needle: &str) -> Self {
        Cue::ContainsIgnoreCase(needle.to_string())
    }

    fn holds(&self, sample: &Sample<'_>) -> bool {
        match self {
            Cue::StartsWith(prefixes) => prefixes.iter().any(|p| sample.trimmed.starts_with(p.as_str())),
            Cue::Contains(needle) => sample.text.contains(needle.as_str()),
            Cue::ContainsIgnoreCase(needle) => {
                sample.lower.contains(needle.to_ascii_lowercase().as_str())
            }
            Cue::All(cues) => cues.iter().all(|c| c.holds(sample)),
            Cue::Any(cues) => cues.iter().any(|c| c.holds(sample)),
        }
    }
}

/// A ranked rule mapping a cue to a language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRule {
    pub language: String,
    pub when: Cue,
}

impl LanguageRule {
    pub fn new(language: &str, when: Cue) -> Self {
        Self {
            language: language.to_string(),
            when,
        }
    }
}

struct Sample<'a> {
    text: &'a str,
    trimmed: &'a str,
    lower: String,
}

/// First-match-wins code classifier.
#[derive(Debug, Clone)]
pub struct CodeClassifier {
    rules: Vec<LanguageRule>,
}

impl CodeClassifier {
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            rules: config.code_rules.clone(),
        }
    }

    /// Guess the language of a code fragment; `None` renders an untagged fence.
    pub fn classify(&self, text: &str) -> Option<String> {
        let sample = Sample {
            text,
            trimmed: text.trim(),
            lower: text.to_ascii_lowercase(),
        };
        self.rules
            .iter()
            .find(|rule| rule.when.holds(&sample))
            .map(|rule| rule.language.clone())
    }
}

impl Default for CodeClassifier {
    fn default() -> Self {
        Self::new(&ClassifyConfig::default())
    }
}

static DEFAULT_CLASSIFIER: LazyLock<CodeClassifier> = LazyLock::new(CodeClassifier::default);

/// Guess a language tag using the built-in rule table.
pub fn classify_code(text: &str) -> Option<String> {
    DEFAULT_CLASSIFIER.classify(text)
}

/// The built-in rule table, in priority order.
pub(crate) fn default_rules() -> Vec<LanguageRule> {
    vec![
        LanguageRule::new(
            "bash",
            Cue::starts_with(&["$", ">", "npm", "shopify", "cd ", "mkdir"]),
        ),
        LanguageRule::new(
            "javascript",
            Cue::All(vec![
                Cue::contains("import "),
                Cue::Any(vec![
                    Cue::contains("from "),
                    Cue::contains_ignore_case("react"),
                ]),
            ]),
        ),
        LanguageRule::new(
            "javascript",
            Cue::All(vec![
                Cue::contains("function"),
                Cue::Any(vec![Cue::contains("{"), Cue::contains("=>")]),
            ]),
        ),
        LanguageRule::new("json", Cue::starts_with(&["{", "["])),
        LanguageRule::new(
            "toml",
            Cue::All(vec![
                Cue::contains("="),
                Cue::Any(vec![Cue::contains("["), Cue::contains("name =")]),
            ]),
        ),
        LanguageRule::new(
            "graphql",
            Cue::Any(vec![
                Cue::All(vec![
                    Cue::contains_ignore_case("query"),
                    Cue::Any(vec![
                        Cue::contains("{"),
                        Cue::contains_ignore_case("mutation"),
                    ]),
                ]),
                Cue::All(vec![
                    Cue::contains_ignore_case("mutation"),
                    Cue::contains("{"),
                ]),
            ]),
        ),
    ]
}
