//! Sequential conversion of a whole documentation mapping.
//!
//! A mapping file is a JSON object from relative output path to source URL:
//!
//! ```json
//! {
//!   "apps/build/setup.md": "https://example.com/docs/apps/build/setup",
//!   "api/admin/queries.md": "https://example.com/docs/api/admin/queries"
//! }
//! ```
//!
//! Entries are converted one at a time. A failing entry is recorded and the
//! loop moves on.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::convert::{Converter, write_document};
use crate::error::{Error, Result};

/// One output document and the page it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Relative to the output directory.
    pub output: PathBuf,
    pub url: String,
}

/// Parse a mapping document. Entries come back sorted by output path.
pub fn parse_mapping(json: &str) -> Result<Vec<MappingEntry>> {
    let map: BTreeMap<String, String> = serde_json::from_str(json)?;
    Ok(map
        .into_iter()
        .map(|(output, url)| MappingEntry {
            output: PathBuf::from(output),
            url,
        })
        .collect())
}

pub fn load_mapping(path: impl AsRef<Path>) -> Result<Vec<MappingEntry>> {
    parse_mapping(&std::fs::read_to_string(path)?)
}

/// Supplies the raw markup of a page.
pub trait PageSource {
    fn fetch(&self, entry: &MappingEntry) -> Result<Vec<u8>>;
}

/// Pages fetched ahead of time into a directory that mirrors the output
/// layout: `guides/setup.md` is read from `<root>/guides/setup.html`.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn page_path(&self, entry: &MappingEntry) -> PathBuf {
        self.root.join(entry.output.with_extension("html"))
    }
}

impl PageSource for SnapshotSource {
    fn fetch(&self, entry: &MappingEntry) -> Result<Vec<u8>> {
        match std::fs::read(self.page_path(entry)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::MissingPage(entry.url.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub output: PathBuf,
    pub url: String,
    pub error: String,
}

/// Outcome of a batch run, printed as JSON by `docmark batch --json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert every entry into `out_dir`.
pub fn convert_all(
    converter: &Converter,
    entries: &[MappingEntry],
    source: &dyn PageSource,
    out_dir: &Path,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for entry in entries {
        match convert_entry(converter, entry, source, out_dir) {
            Ok(path) => {
                tracing::debug!(url = %entry.url, path = %path.display(), "converted");
                summary.converted.push(path);
            }
            Err(err) => {
                tracing::warn!(url = %entry.url, error = %err, "conversion failed");
                summary.failed.push(BatchFailure {
                    output: entry.output.clone(),
                    url: entry.url.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        converted = summary.converted.len(),
        failed = summary.failed.len(),
        "batch finished"
    );
    summary
}

fn convert_entry(
    converter: &Converter,
    entry: &MappingEntry,
    source: &dyn PageSource,
    out_dir: &Path,
) -> Result<PathBuf> {
    if !is_contained(&entry.output) {
        return Err(Error::UnsafePath(entry.output.clone()));
    }
    let bytes = source.fetch(entry)?;
    let document = converter.convert_bytes(&bytes, &entry.url);
    let path = out_dir.join(&entry.output);
    write_document(&path, &document)?;
    Ok(path)
}

/// Relative and free of `..`.
fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
