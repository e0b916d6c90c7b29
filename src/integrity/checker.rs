use regex::Regex;

use super::report::{CorruptionReport, IssueCategory};
use crate::config::{IntegrityConfig, TreeReplacement};
use crate::error::{Error, Result};

/// Canonical folder glyph used in repaired icon markers.
pub const FOLDER_ICON: char = '📁';

const FENCE: &str = "```";

/// Upper bound on repair passes. Default tables reach a fixed point in one or
/// two; the bound only matters for replacement tables that feed themselves.
const MAX_PASSES: usize = 16;

/// Detects and repairs corruption signatures in Markdown text.
#[derive(Debug, Clone)]
pub struct ContentChecker {
    control_chars: Vec<char>,
    icon_patterns: Vec<Regex>,
    tree_replacements: Vec<TreeReplacement>,
    directory_marker: String,
}

impl ContentChecker {
    /// Compile the configured tables. Fails only on an invalid icon pattern.
    pub fn new(config: &IntegrityConfig) -> Result<Self> {
        let icon_patterns = config
            .icon_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            control_chars: config.control_chars.clone(),
            icon_patterns,
            tree_replacements: config.tree_replacements.clone(),
            directory_marker: config.directory_marker.clone(),
        })
    }

    /// Scan `content` line by line.
    ///
    /// A line matching several icon patterns is reported once per pattern.
    pub fn check(&self, content: &str) -> CorruptionReport {
        let mut report = CorruptionReport::default();
        let listing = self.looks_like_listing(content);

        for (index, line) in content.split('\n').enumerate() {
            let n = index + 1;

            if line.chars().any(|c| self.control_chars.contains(&c)) {
                report.push(
                    IssueCategory::UnicodeIssues,
                    n,
                    format!("Line {n}: Binary Unicode characters detected"),
                );
            }

            for pattern in &self.icon_patterns {
                if pattern.is_match(line) {
                    report.push(
                        IssueCategory::FileIconIssues,
                        n,
                        format!("Line {n}: Corrupted file icon - {}", line.trim()),
                    );
                }
            }

            if listing && line.chars().any(|c| self.tree_replacement(c).is_some()) {
                report.push(
                    IssueCategory::DirectoryStructureIssues,
                    n,
                    format!("Line {n}: Unicode tree characters in directory structure"),
                );
            }
        }

        tracing::debug!(
            unicode = report.unicode_issues.len(),
            icons = report.file_icon_issues.len(),
            tree = report.directory_structure_issues.len(),
            "content check finished"
        );
        report
    }

    /// Repair `content` until no repair step changes it.
    ///
    /// The result is a fixed point of [`fix_once`](Self::fix_once), so
    /// `fix(fix(x)) == fix(x)`.
    pub fn fix(&self, content: &str) -> String {
        let mut current = self.fix_once(content);
        for _ in 1..MAX_PASSES {
            let next = self.fix_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
        tracing::debug!("repair did not settle within {MAX_PASSES} passes");
        current
    }

    /// One repair pass: icon markers, then tree characters, then stray
    /// control bytes. Stripping must come last; icon repair keys on the
    /// corruption markers it would remove.
    pub fn fix_once(&self, content: &str) -> String {
        let mut fixed = content.to_string();
        for pattern in &self.icon_patterns {
            if pattern.is_match(&fixed) {
                fixed = pattern
                    .replace_all(&fixed, |caps: &regex::Captures<'_>| repair_icon(&caps[0]))
                    .into_owned();
            }
        }

        let mut out = String::with_capacity(fixed.len());
        for c in fixed.chars() {
            if let Some(to) = self.tree_replacement(c) {
                out.push_str(to);
            } else if !self.is_stray(c) {
                out.push(c);
            }
        }
        out
    }

    /// Box-drawing characters only count as a broken listing when the
    /// document has a code fence and mentions the directory marker.
    fn looks_like_listing(&self, content: &str) -> bool {
        content.contains(FENCE) && content.contains(self.directory_marker.as_str())
    }

    fn tree_replacement(&self, c: char) -> Option<&str> {
        self.tree_replacements
            .iter()
            .find(|r| r.from == c)
            .map(|r| r.to.as_str())
    }

    /// Control and Latin-1 high bytes, keeping tab, newline and carriage return.
    fn is_stray(&self, c: char) -> bool {
        matches!(c, '\x00'..='\x08' | '\x0B' | '\x0C' | '\x0E'..='\x1F' | '\x7F'..='\u{FF}')
            || self.control_chars.contains(&c)
    }
}

/// Rewrite one corrupted bold segment as `**📁 name**`.
fn repair_icon(segment: &str) -> String {
    let inner = segment
        .strip_prefix("**")
        .and_then(|s| s.strip_suffix("**"))
        .unwrap_or(segment);
    let inner = inner.strip_prefix('=').unwrap_or(inner);
    let name = inner
        .replace('\u{FFFD}', "")
        .replace("\\ufffd", "")
        .replace('*', "");
    let name = name.trim();
    if name.is_empty() {
        format!("**{FOLDER_ICON}**")
    } else {
        format!("**{FOLDER_ICON} {name}**")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ContentChecker {
        ContentChecker::new(&IntegrityConfig::default()).unwrap()
    }

    #[test]
    fn test_repair_replacement_char_icon() {
        assert_eq!(checker().fix("**=\u{FFFD}corrupted**"), "**📁 corrupted**");
    }

    #[test]
    fn test_repair_escaped_icon() {
        assert_eq!(checker().fix(r"- **=\ufffdsrc**"), "- **📁 src**");
    }

    #[test]
    fn test_repair_generic_icon() {
        assert_eq!(checker().fix("**=assets**"), "**📁 assets**");
        assert_eq!(checker().fix("**=***"), "**📁**");
    }

    #[test]
    fn test_canonical_icon_untouched() {
        let text = "**📁 src**\n**bold** and a = b\n";
        assert!(!checker().check(text).has_issues());
        assert_eq!(checker().fix(text), text);
    }

    #[test]
    fn test_icon_line_logged_per_pattern() {
        let report = checker().check("ok\n**=\u{FFFD}x**");
        // Matches the replacement-char pattern and the generic one.
        assert_eq!(report.file_icon_issues.len(), 2);
        assert_eq!(report.file_icon_issues[0].line, 2);
        assert_eq!(
            report.file_icon_issues[0].description,
            "Line 2: Corrupted file icon - **=\u{FFFD}x**"
        );
    }

    #[test]
    fn test_control_chars_flagged_and_stripped() {
        let text = "clean\nbad\x1cline\x02\n";
        let report = checker().check(text);
        assert_eq!(report.unicode_issues.len(), 1);
        assert_eq!(
            report.unicode_issues[0].description,
            "Line 2: Binary Unicode characters detected"
        );
        assert_eq!(checker().fix(text), "clean\nbadline\n");
    }

    #[test]
    fn test_fix_keeps_tabs_crlf_and_emoji() {
        let text = "\tindent\r\n💡 tip ✅\n";
        assert_eq!(checker().fix(text), text);
    }

    #[test]
    fn test_fix_strips_latin1_high_bytes() {
        assert_eq!(checker().fix("caf\u{e9} \u{a0}x"), "caf x");
    }

    #[test]
    fn test_tree_chars_need_fence_and_marker() {
        let listing = "```\nextensions/\n├── src\n└── README.md\n```";
        let report = checker().check(listing);
        assert_eq!(report.directory_structure_issues.len(), 2);
        assert_eq!(report.directory_structure_issues[0].line, 3);

        let no_marker = "```\napp/\n├── src\n```";
        assert!(checker().check(no_marker).directory_structure_issues.is_empty());

        let no_fence = "extensions/\n├── src";
        assert!(checker().check(no_fence).directory_structure_issues.is_empty());
    }

    #[test]
    fn test_marker_anywhere_in_document() {
        let text = "See extensions/ below.\n\n```\napp\n│   └── x\n```";
        assert_eq!(checker().check(text).directory_structure_issues.len(), 1);
    }

    #[test]
    fn test_tree_chars_replaced_everywhere() {
        assert_eq!(
            checker().fix("├── a\n│   └── b\n┌─┐\n└─┘┴"),
            "|-- a\n|   +-- b\n+-+\n+-++"
        );
    }

    #[test]
    fn test_tree_replacement_never_opens_code() {
        let fixed = checker().fix("Layout: └└└ then └── done\n");
        assert_eq!(fixed, "Layout: +++ then +-- done\n");
        assert!(!fixed.contains('`'));
        assert_eq!(crate::metadata::DocumentStats::compute(&fixed).code_blocks, 0);
    }

    #[test]
    fn test_adjacent_markers_settle() {
        let fixed = checker().fix("**=a**=b**");
        assert_eq!(fixed, "**📁 a**📁 b**");
        assert!(!checker().check(&fixed).has_issues());
    }

    #[test]
    fn test_control_char_hiding_marker() {
        let fixed = checker().fix("**\x02=x**");
        assert_eq!(fixed, "**📁 x**");
    }

    #[test]
    fn test_invalid_pattern() {
        let config = IntegrityConfig {
            icon_patterns: vec!["(".into()],
            ..IntegrityConfig::default()
        };
        let err = ContentChecker::new(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
