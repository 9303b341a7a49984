//! Per-extractor document text cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{Result, TextSource};

/// Lazily filled map from document path to extracted text.
///
/// Documents are immutable for the lifetime of a run, so entries are never
/// invalidated or evicted.
#[derive(Debug, Default)]
pub struct TextCache {
    entries: HashMap<PathBuf, String>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached text for `path`, extracting it through `source` on first access.
    pub fn get_or_load<S: TextSource + ?Sized>(&mut self, source: &S, path: &Path) -> Result<&str> {
        if !self.entries.contains_key(path) {
            let text = source.get_text(path)?;
            trace!("Cached {} chars for {}", text.len(), path.display());
            self.entries.insert(path.to_path_buf(), text);
        }
        Ok(self.entries[path].as_str())
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl TextSource for CountingSource {
        fn get_text(&self, path: &Path) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if path.ends_with("broken.pdf") {
                return Err(PdfError::TextExtraction("corrupt".to_string()));
            }
            Ok(format!("text of {}", path.display()))
        }
    }

    #[test]
    fn test_loads_each_document_once() {
        let source = CountingSource { calls: Cell::new(0) };
        let mut cache = TextCache::new();

        let first = cache.get_or_load(&source, Path::new("a.pdf")).unwrap().to_string();
        let second = cache.get_or_load(&source, Path::new("a.pdf")).unwrap().to_string();
        cache.get_or_load(&source, Path::new("b.pdf")).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let source = CountingSource { calls: Cell::new(0) };
        let mut cache = TextCache::new();

        assert!(cache.get_or_load(&source, Path::new("broken.pdf")).is_err());
        assert!(cache.get_or_load(&source, Path::new("broken.pdf")).is_err());
        assert_eq!(source.calls.get(), 2);
        assert!(cache.is_empty());
    }
}
