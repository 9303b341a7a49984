//! Document corpus listing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SigexError};

/// A source document and its stable id (file name without extension).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Document {
    pub id: String,
    pub path: PathBuf,
}

impl Document {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, path }
    }
}

/// List every PDF in a company directory, sorted by path.
///
/// A missing directory or one without PDFs is an error for that company.
pub fn list_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(SigexError::Corpus(format!(
            "PDF directory not found: {}",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            documents.push(Document::from_path(path));
        }
    }

    if documents.is_empty() {
        return Err(SigexError::Corpus(format!(
            "no PDF files found in {}",
            dir.display()
        )));
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} documents in {}", documents.len(), dir.display());
    Ok(documents)
}
