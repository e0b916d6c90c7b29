//! End-to-end conversion of page markup into a finished document.

use std::borrow::Cow;
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::config::Config;
use crate::dom::PageTree;
use crate::error::Result;
use crate::integrity::ContentChecker;
use crate::metadata::MetadataGenerator;
use crate::transform::DocumentTransformer;

/// How far into a page to look for a `charset=` declaration.
const CHARSET_SNIFF_LEN: usize = 1024;

/// Decode page bytes to text.
///
/// 1. UTF-8 (a BOM is honored and stripped)
/// 2. the encoding named by a `charset=` declaration near the top of the page
/// 3. Windows-1252, a superset of ISO-8859-1
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(label) = sniff_charset(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
        && encoding != encoding_rs::UTF_8
    {
        tracing::debug!(encoding = encoding.name(), "decoding page with declared charset");
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    tracing::warn!("page is not valid UTF-8, decoding as windows-1252");
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

fn sniff_charset(bytes: &[u8]) -> Option<String> {
    let head = bytes[..bytes.len().min(CHARSET_SNIFF_LEN)].to_ascii_lowercase();
    let start = memchr::memmem::find(&head, b"charset=")? + b"charset=".len();
    let label: String = head[start..]
        .iter()
        .skip_while(|&&b| b == b'"' || b == b'\'')
        .take_while(|&&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
        .map(|&b| b as char)
        .collect();
    (!label.is_empty()).then_some(label)
}

/// Page markup in, annotated Markdown document out.
pub struct Converter {
    transformer: DocumentTransformer,
    metadata: MetadataGenerator,
    repair: Option<ContentChecker>,
}

impl Converter {
    /// Build every component from `config`. Fails only when integrity repair
    /// is enabled and an icon pattern does not compile.
    pub fn new(config: &Config) -> Result<Self> {
        let repair = if config.transform.repair_output {
            Some(ContentChecker::new(&config.integrity)?)
        } else {
            None
        };
        Ok(Self {
            transformer: DocumentTransformer::new(config),
            metadata: MetadataGenerator::new(&config.metadata),
            repair,
        })
    }

    pub fn convert_tree_at(&self, tree: PageTree, source_url: &str, at: NaiveDateTime) -> String {
        let doc = self.transformer.transform(tree, source_url);
        let output = self.metadata.annotate_at(&doc.markdown, source_url, at);
        match &self.repair {
            Some(checker) => checker.fix(&output),
            None => output,
        }
    }

    pub fn convert_html_at(&self, html: &str, source_url: &str, at: NaiveDateTime) -> String {
        self.convert_tree_at(PageTree::parse(html), source_url, at)
    }

    /// Convert markup, stamping the document with the current local time.
    pub fn convert_html(&self, html: &str, source_url: &str) -> String {
        self.convert_html_at(html, source_url, Local::now().naive_local())
    }

    /// Convert undecoded page bytes.
    pub fn convert_bytes(&self, bytes: &[u8], source_url: &str) -> String {
        self.convert_html(&decode_html(bytes), source_url)
    }
}

/// Write a finished document, creating parent directories.
pub fn write_document(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
