//! Document text sources.

mod cache;
mod extractor;

pub use cache::TextCache;
pub use extractor::PdfTextExtractor;

use std::path::Path;

use crate::error::PdfError;

/// Result type for text source operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Anything that can turn a document path into its full text.
///
/// Page structure is not preserved: implementations return the whole
/// document as one string.
pub trait TextSource {
    /// Extract the full text of the document at `path`.
    fn get_text(&self, path: &Path) -> Result<String>;
}

impl<T: TextSource + ?Sized> TextSource for Box<T> {
    fn get_text(&self, path: &Path) -> Result<String> {
        (**self).get_text(path)
    }
}
