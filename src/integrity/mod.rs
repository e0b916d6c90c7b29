//! Content integrity checking for generated Markdown.
//!
//! A document is in one of three states:
//!
//! - [`IntegrityState::Clean`]: no corruption signatures.
//! - [`IntegrityState::IssuesFound`]: signatures present; [`ContentChecker::fix`]
//!   repairs them deterministically.
//! - [`IntegrityState::BinaryCorrupt`]: the bytes are not valid UTF-8. No
//!   repair is attempted; the document has to be regenerated.

mod checker;
mod report;

use std::fmt::Write as _;
use std::path::Path;

pub use checker::{ContentChecker, FOLDER_ICON};
pub use report::{CorruptionReport, Issue, IssueCategory};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityState {
    Clean,
    IssuesFound,
    BinaryCorrupt,
}

impl IntegrityState {
    pub fn as_str(self) -> &'static str {
        match self {
            IntegrityState::Clean => "clean",
            IntegrityState::IssuesFound => "issues_found",
            IntegrityState::BinaryCorrupt => "binary_corrupt",
        }
    }
}

/// Outcome of validating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Clean {
        content: String,
    },
    Repairable {
        report: CorruptionReport,
        fixed: String,
    },
    /// Decoding failed after `valid_up_to` bytes.
    BinaryCorrupt {
        valid_up_to: usize,
    },
}

impl Validation {
    pub fn state(&self) -> IntegrityState {
        match self {
            Validation::Clean { .. } => IntegrityState::Clean,
            Validation::Repairable { .. } => IntegrityState::IssuesFound,
            Validation::BinaryCorrupt { .. } => IntegrityState::BinaryCorrupt,
        }
    }

    pub fn report(&self) -> Option<&CorruptionReport> {
        match self {
            Validation::Repairable { report, .. } => Some(report),
            _ => None,
        }
    }
}

impl ContentChecker {
    /// Validate raw document bytes.
    pub fn validate_bytes(&self, bytes: &[u8]) -> Validation {
        let content = match std::str::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(valid_up_to = err.valid_up_to(), "document is not valid UTF-8");
                return Validation::BinaryCorrupt {
                    valid_up_to: err.valid_up_to(),
                };
            }
        };

        let report = self.check(content);
        if report.has_issues() {
            Validation::Repairable {
                fixed: self.fix(content),
                report,
            }
        } else {
            Validation::Clean {
                content: content.to_string(),
            }
        }
    }

    /// Read and validate a document. I/O failures are returned as errors;
    /// undecodable content is a [`Validation::BinaryCorrupt`] outcome.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<Validation> {
        let bytes = std::fs::read(path)?;
        Ok(self.validate_bytes(&bytes))
    }
}

/// Examples listed per category in a human-readable summary.
pub const EXAMPLES_PER_CATEGORY: usize = 3;

/// Human-readable outcome for `path`, as printed by the command line tools.
pub fn summarize(path: &str, validation: &Validation) -> String {
    match validation {
        Validation::Clean { .. } => format!("✅ {path} is clean - no issues detected\n"),
        Validation::BinaryCorrupt { valid_up_to } => format!(
            "❌ {path} is binary-corrupt (invalid UTF-8 after byte {valid_up_to})\n   \
             The file must be recreated from its source page; no repair was attempted.\n"
        ),
        Validation::Repairable { report, .. } => {
            let mut out = format!("❌ Issues found in {path}:\n");
            for category in IssueCategory::ALL {
                let issues = report.issues(category);
                if issues.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "  {category}: {} issues", issues.len());
                for issue in issues.iter().take(EXAMPLES_PER_CATEGORY) {
                    let _ = writeln!(out, "    - {}", issue.description);
                }
                if issues.len() > EXAMPLES_PER_CATEGORY {
                    let _ = writeln!(out, "    ... and {} more", issues.len() - EXAMPLES_PER_CATEGORY);
                }
            }
            out
        }
    }
}
