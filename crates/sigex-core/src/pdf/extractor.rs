//! PDF text extraction using lopdf and pdf-extract.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextSource};
use crate::error::PdfError;

/// PDF text source backed by lopdf (loading, decryption) and pdf-extract (text).
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF text extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the full text of an in-memory PDF.
    pub fn extract_from_mem(&self, data: &[u8]) -> Result<String> {
        let raw = Self::prepare(data)?;
        let text = pdf_extract::extract_text_from_mem(&raw)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        trace!("Extracted {} chars of text", text.len());
        Ok(text)
    }

    /// Validate the document and return bytes pdf-extract can read.
    ///
    /// Documents encrypted with an empty user password are decrypted and
    /// re-serialized; anything else encrypted is rejected.
    fn prepare(data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(raw)
    }
}

impl TextSource for PdfTextExtractor {
    fn get_text(&self, path: &Path) -> Result<String> {
        let data = fs::read(path).map_err(|source| PdfError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_from_mem(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_read_error() {
        let extractor = PdfTextExtractor::new();
        let err = extractor
            .get_text(Path::new("/nonexistent/policy.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Read { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_parse_error() {
        let extractor = PdfTextExtractor::new();
        let err = extractor.extract_from_mem(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }
}
