//! Error types for the sigex-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the sigex library.
#[derive(Error, Debug)]
pub enum SigexError {
    /// Text source (PDF) error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Extraction or mapping configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Field mapping error.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Document corpus error.
    #[error("corpus error: {0}")]
    Corpus(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to reading text out of a source document.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to read the file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while loading or validating a company configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON or has the wrong shape.
    #[error("malformed configuration {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field configuration has an invalid shape.
    #[error("invalid configuration for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// A mapping rule regex failed to compile.
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while mapping one field of a raw extraction artifact.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Field data is not a document id to value object.
    #[error("field '{field}' is not an object of document values")]
    NotAnObject { field: String },

    /// A numeric rule produced a value outside the target type.
    #[error("numeric value out of range: {0}")]
    Overflow(String),
}

/// Result type for the sigex library.
pub type Result<T> = std::result::Result<T, SigexError>;
