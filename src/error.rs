//! Error types for docmark operations.

use thiserror::Error;

/// Errors that can occur while converting or checking documents.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Markdown rendering failed: {0}")]
    Render(#[from] crate::markdown::RenderError),

    #[error("No page markup for {0}")]
    MissingPage(String),

    #[error("Output path escapes the output directory: {0}")]
    UnsafePath(std::path::PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
