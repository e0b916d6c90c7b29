use std::fmt;

use serde::Serialize;

/// Kind of corruption a line was flagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    UnicodeIssues,
    FileIconIssues,
    DirectoryStructureIssues,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 3] = [
        IssueCategory::UnicodeIssues,
        IssueCategory::FileIconIssues,
        IssueCategory::DirectoryStructureIssues,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::UnicodeIssues => "unicode_issues",
            IssueCategory::FileIconIssues => "file_icon_issues",
            IssueCategory::DirectoryStructureIssues => "directory_structure_issues",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// 1-based.
    pub line: usize,
    pub description: String,
}

/// Issues found by a single check, grouped by category in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorruptionReport {
    pub unicode_issues: Vec<Issue>,
    pub file_icon_issues: Vec<Issue>,
    pub directory_structure_issues: Vec<Issue>,
}

impl CorruptionReport {
    pub fn has_issues(&self) -> bool {
        IssueCategory::ALL
            .iter()
            .any(|&category| !self.issues(category).is_empty())
    }

    pub fn issues(&self, category: IssueCategory) -> &[Issue] {
        match category {
            IssueCategory::UnicodeIssues => &self.unicode_issues,
            IssueCategory::FileIconIssues => &self.file_icon_issues,
            IssueCategory::DirectoryStructureIssues => &self.directory_structure_issues,
        }
    }

    pub fn total(&self) -> usize {
        IssueCategory::ALL
            .iter()
            .map(|&category| self.issues(category).len())
            .sum()
    }

    pub(crate) fn push(&mut self, category: IssueCategory, line: usize, description: String) {
        let issue = Issue { line, description };
        match category {
            IssueCategory::UnicodeIssues => self.unicode_issues.push(issue),
            IssueCategory::FileIconIssues => self.file_icon_issues.push(issue),
            IssueCategory::DirectoryStructureIssues => self.directory_structure_issues.push(issue),
        }
    }
}
