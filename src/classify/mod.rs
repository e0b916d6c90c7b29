//! Heuristic classifiers.
//!
//! Both classifiers are pure, total functions over ranked rule lists: the
//! first rule that matches wins, and every input falls through to a fixed
//! default. The rule lists come from [`ClassifyConfig`](crate::config::ClassifyConfig).

mod code;
mod image;

pub use code::{CodeClassifier, Cue, LanguageRule, classify_code};
pub(crate) use code::default_rules as default_code_rules;
pub use image::{ImageClassifier, ImageRule, classify_image};
