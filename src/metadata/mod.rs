//! Corpus statistics and frontmatter.
//!
//! The output layout is a stable contract for downstream tooling:
//!
//! ```text
//! ---
//! title: "Build An App"
//! source: "https://example.com/docs/build-an-app"
//! converted_for: "AI coding assistant"
//! conversion_date: "2024-05-01 09:30:00"
//! stats:
//!   words: 812
//!   code_blocks: 6
//!   images: 2
//! ---
//!
//! ## 🤖 AI Assistant Analysis
//! ...
//! ---
//!
//! <body>
//! ```

use chrono::{Local, NaiveDateTime};
use memchr::memmem;
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::config::MetadataConfig;
use crate::transform::IMAGE_MARKER;

/// `conversion_date` format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FENCE: &[u8] = b"```";

/// Counts derived from a Markdown body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub words: usize,
    pub code_blocks: usize,
    pub images: usize,
}

impl DocumentStats {
    pub fn compute(markdown: &str) -> Self {
        let bytes = markdown.as_bytes();
        Self {
            words: markdown.split_whitespace().count(),
            code_blocks: memmem::find_iter(bytes, FENCE).count() / 2,
            images: memmem::find_iter(bytes, IMAGE_MARKER.as_bytes()).count(),
        }
    }
}

/// Converted Markdown together with its statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDocument {
    pub markdown: String,
    pub stats: DocumentStats,
}

impl AnnotatedDocument {
    pub fn new(markdown: String) -> Self {
        let stats = DocumentStats::compute(&markdown);
        Self { markdown, stats }
    }
}

/// Header record written ahead of every converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub title: String,
    pub source_url: String,
    pub converted_for: String,
    pub conversion_timestamp: NaiveDateTime,
    pub stats: DocumentStats,
}

impl Frontmatter {
    pub fn render(&self) -> String {
        format!(
            "---\n\
             title: {}\n\
             source: {}\n\
             converted_for: {}\n\
             conversion_date: \"{}\"\n\
             stats:\n  \
             words: {}\n  \
             code_blocks: {}\n  \
             images: {}\n\
             ---\n\n",
            quote(&self.title),
            quote(&self.source_url),
            quote(&self.converted_for),
            self.conversion_timestamp.format(TIMESTAMP_FORMAT),
            self.stats.words,
            self.stats.code_blocks,
            self.stats.images,
        )
    }
}

/// YAML double-quoted scalar.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Fixed summary placed between frontmatter and body.
pub fn analysis_block(stats: &DocumentStats) -> String {
    format!(
        "## 🤖 AI Assistant Analysis\n\
         \n\
         **Content optimized for AI assistance:**\n\
         - {} code examples ready for analysis\n\
         - {} visual elements converted to descriptions\n\
         - Structured markdown with enhanced formatting\n\
         - Cross-reference ready internal links\n\
         \n\
         **Ready for an AI coding assistant to help with:**\n\
         - Code review and optimization\n\
         - Implementation guidance\n\
         - Troubleshooting and debugging\n\
         - Best practices recommendations\n\
         \n\
         ---\n\
         \n",
        stats.code_blocks, stats.images
    )
}

/// Human title from the last path segment of a URL.
///
/// Query and fragment are ignored, a trailing slash is skipped, the segment
/// is percent-decoded, hyphens become spaces and words are title-cased.
pub fn title_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let title = title_case(&decoded.replace('-', " "));
    let title = title.trim();
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.to_string()
    }
}

/// Uppercase the first cased letter of every run of cased letters and
/// lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && prev_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_cased = cased;
    }
    out
}

/// Prepends frontmatter and the analysis block to converted Markdown.
#[derive(Debug, Clone, Default)]
pub struct MetadataGenerator {
    config: MetadataConfig,
}

impl MetadataGenerator {
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn frontmatter(&self, markdown: &str, source_url: &str, at: NaiveDateTime) -> Frontmatter {
        Frontmatter {
            title: title_from_url(source_url),
            source_url: source_url.to_string(),
            converted_for: self.config.converted_for.clone(),
            conversion_timestamp: at,
            stats: DocumentStats::compute(markdown),
        }
    }

    /// Build the final document, stamped with the current local time.
    pub fn annotate(&self, markdown: &str, source_url: &str) -> String {
        self.annotate_at(markdown, source_url, Local::now().naive_local())
    }

    pub fn annotate_at(&self, markdown: &str, source_url: &str, at: NaiveDateTime) -> String {
        let frontmatter = self.frontmatter(markdown, source_url, at);
        let mut out = frontmatter.render();
        if self.config.include_analysis {
            out.push_str(&analysis_block(&frontmatter.stats));
        }
        out.push_str(markdown);
        out
    }
}

/// Annotate with the default configuration.
pub fn annotate(markdown: &str, source_url: &str) -> String {
    MetadataGenerator::default().annotate(markdown, source_url)
}
