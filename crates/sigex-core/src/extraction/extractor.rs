//! Extraction orchestrator: every configured field over every document of a company.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::engine::{CompiledField, PatternEngine};
use super::stats::{ExtractionSummary, FieldStats};
use crate::corpus::Document;
use crate::error::{PdfError, Result};
use crate::models::config::SigexSettings;
use crate::models::extraction::{CompanyExtractionConfig, ExtractionResult, RawArtifact};
use crate::pdf::{TextCache, TextSource};

/// A document whose text could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: String,
}

/// Results of extracting a whole corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusExtraction {
    /// Field name to document id to value.
    pub fields: RawArtifact,
    /// Per-field success counts over processed documents.
    pub stats: BTreeMap<String, FieldStats>,
    /// Documents processed, failed ones included.
    pub documents: usize,
    /// Documents skipped because their text could not be read.
    pub failed: Vec<DocumentFailure>,
    /// Set when the run was interrupted before every document was processed.
    pub interrupted: bool,
}

impl CorpusExtraction {
    pub fn summary(&self, threshold: f64) -> ExtractionSummary {
        ExtractionSummary::new(self.stats.clone(), threshold)
    }

    /// Write the raw artifact (`field -> document -> value`) as pretty JSON.
    pub fn save_artifact(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.fields)?)?;
        debug!("Wrote extraction artifact to {}", path.display());
        Ok(())
    }
}

/// Extracts configured fields from a company's documents.
///
/// Owns the text cache: each document is read through the text source at
/// most once per extractor.
pub struct PolicyExtractor<S: TextSource> {
    company: String,
    fields: BTreeMap<String, Option<CompiledField>>,
    engine: PatternEngine,
    source: S,
    cache: TextCache,
    continue_on_error: bool,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<S: TextSource> PolicyExtractor<S> {
    /// Create an extractor from an already loaded configuration.
    pub fn new(company: impl Into<String>, config: &CompanyExtractionConfig, source: S) -> Self {
        Self::with_engine(company, config, source, PatternEngine::new())
    }

    /// Create an extractor using a specific pattern engine.
    pub fn with_engine(
        company: impl Into<String>,
        config: &CompanyExtractionConfig,
        source: S,
        engine: PatternEngine,
    ) -> Self {
        let fields = config
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.as_ref().map(|f| engine.compile_field(f))))
            .collect();

        Self {
            company: company.into(),
            fields,
            engine,
            source,
            cache: TextCache::new(),
            continue_on_error: false,
            interrupt: None,
        }
    }

    /// Load the company's extraction config from the configured directory layout.
    pub fn from_settings(company: &str, settings: &SigexSettings, source: S) -> Result<Self> {
        let path = settings.paths.extraction_config(company);
        let config = CompanyExtractionConfig::from_file(&path)?;
        let engine = PatternEngine::new().with_size_limit(settings.extraction.regex_size_limit);
        info!("Loaded {} field configs for {}", config.fields.len(), company);

        Ok(Self::with_engine(company, &config, source, engine)
            .with_continue_on_error(settings.extraction.continue_on_error))
    }

    /// Record unreadable documents instead of aborting the corpus.
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Stop between documents once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn engine(&self) -> &PatternEngine {
        &self.engine
    }

    /// Configured field names, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Full text of a document, cached.
    pub fn text(&mut self, path: &Path) -> std::result::Result<&str, PdfError> {
        self.cache.get_or_load(&self.source, path)
    }

    /// Extract one field from one document. Unknown and null-configured fields yield `None`.
    pub fn extract_field(&mut self, path: &Path, field: &str) -> Result<ExtractionResult> {
        let Some(Some(compiled)) = self.fields.get(field) else {
            return Ok(None);
        };
        let text = self.cache.get_or_load(&self.source, path)?;
        Ok(compiled.extract(text))
    }

    /// Extract every configured field from one document.
    pub fn extract_all_fields(&mut self, path: &Path) -> Result<BTreeMap<String, ExtractionResult>> {
        let text = self.cache.get_or_load(&self.source, path)?;
        Ok(self
            .fields
            .iter()
            .map(|(name, compiled)| (name.clone(), compiled.as_ref().and_then(|c| c.extract(text))))
            .collect())
    }

    /// Ad-hoc pattern with collect-all semantics, for pattern development.
    pub fn test_pattern(&mut self, path: &Path, pattern: &str, group: usize) -> Result<Vec<String>> {
        let compiled = self.engine.compile_pattern(pattern, group);
        let text = self.cache.get_or_load(&self.source, path)?;
        Ok(compiled.all(text))
    }

    /// Extract every field from every document.
    ///
    /// A document whose text cannot be read aborts the run unless
    /// `continue_on_error` is set, in which case all its fields are null.
    pub fn extract_corpus(&mut self, documents: &[Document]) -> Result<CorpusExtraction> {
        let mut result = CorpusExtraction::default();
        for name in self.fields.keys() {
            result.fields.insert(name.clone(), BTreeMap::new());
        }

        for document in documents {
            if self.interrupted() {
                warn!(
                    "Interrupted after {}/{} documents for {}",
                    result.documents,
                    documents.len(),
                    self.company
                );
                result.interrupted = true;
                break;
            }

            debug!("Processing: {}", document.id);
            let values = match self.extract_all_fields(&document.path) {
                Ok(values) => values,
                Err(e) if self.continue_on_error => {
                    warn!("Failed to process {}: {}", document.path.display(), e);
                    result.failed.push(DocumentFailure {
                        document_id: document.id.clone(),
                        error: e.to_string(),
                    });
                    self.fields.keys().map(|name| (name.clone(), None)).collect()
                }
                Err(e) => return Err(e),
            };

            for (field, value) in values {
                result
                    .fields
                    .entry(field)
                    .or_default()
                    .insert(document.id.clone(), value);
            }
            result.documents += 1;
        }

        result.stats = result
            .fields
            .iter()
            .map(|(name, docs)| {
                let successful = docs.values().filter(|v| v.is_some()).count();
                (name.clone(), FieldStats::new(successful, result.documents))
            })
            .collect();

        info!(
            "Extracted {} fields from {} documents for {}",
            result.fields.len(),
            result.documents,
            self.company
        );
        Ok(result)
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Load a raw or mapped artifact as `field -> JSON value`.
pub fn load_artifact(path: &Path) -> Result<BTreeMap<String, Value>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::extraction::ExtractedValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// In-memory documents keyed by path.
    struct MemorySource {
        texts: HashMap<PathBuf, String>,
        reads: Cell<usize>,
    }

    impl MemorySource {
        fn new(docs: &[(&str, &str)]) -> Self {
            Self {
                texts: docs
                    .iter()
                    .map(|(p, t)| (PathBuf::from(p), t.to_string()))
                    .collect(),
                reads: Cell::new(0),
            }
        }
    }

    impl TextSource for &MemorySource {
        fn get_text(&self, path: &Path) -> std::result::Result<String, PdfError> {
            self.reads.set(self.reads.get() + 1);
            self.texts
                .get(path)
                .cloned()
                .ok_or_else(|| PdfError::TextExtraction(format!("unreadable {}", path.display())))
        }
    }

    fn config(value: Value) -> CompanyExtractionConfig {
        CompanyExtractionConfig::from_map(serde_json::from_value(value).unwrap()).unwrap()
    }

    fn docs(paths: &[&str]) -> Vec<Document> {
        paths.iter().map(|p| Document::from_path(*p)).collect()
    }

    #[test]
    fn test_fallback_chain_over_corpus() {
        let source = MemorySource::new(&[
            ("/pdfs/doc1.pdf", "Poliçe No: 111"),
            ("/pdfs/doc2.pdf", "Sözleşme Numarası 222"),
            ("/pdfs/doc3.pdf", "nothing here"),
        ]);
        let cfg = config(json!({
            "Police_No": {
                "patterns": ["Poliçe No: (\\d+)", "Sözleşme Numarası (\\d+)"],
                "mode": "first"
            }
        }));

        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);
        let result = extractor
            .extract_corpus(&docs(&["/pdfs/doc1.pdf", "/pdfs/doc2.pdf", "/pdfs/doc3.pdf"]))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result.fields).unwrap(),
            json!({"Police_No": {"doc1": "111", "doc2": "222", "doc3": null}})
        );
        let stats = result.stats["Police_No"];
        assert_eq!((stats.successful, stats.total), (2, 3));
        assert_eq!(format!("{:.1}", stats.success_rate), "66.7");
    }

    #[test]
    fn test_text_is_read_once_per_document() {
        let source = MemorySource::new(&[("/a.pdf", "Plaka: 34ABC12 Prim: 100")]);
        let cfg = config(json!({
            "Plaka": {"pattern": "Plaka: (\\w+)"},
            "Prim": {"pattern": "Prim: (\\d+)"},
            "Teminat": {"pattern": "Teminat: (\\w+)", "group": "all"}
        }));

        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);
        let values = extractor.extract_all_fields(Path::new("/a.pdf")).unwrap();
        extractor.extract_field(Path::new("/a.pdf"), "Prim").unwrap();

        assert_eq!(source.reads.get(), 1);
        assert_eq!(values["Plaka"], Some(ExtractedValue::Text("34ABC12".into())));
        assert_eq!(values["Teminat"], Some(ExtractedValue::List(vec![])));
    }

    #[test]
    fn test_unknown_and_null_fields() {
        let source = MemorySource::new(&[("/a.pdf", "text")]);
        let cfg = config(json!({"Disabled": null}));
        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);

        assert_eq!(extractor.extract_field(Path::new("/a.pdf"), "Missing").unwrap(), None);
        assert_eq!(extractor.extract_field(Path::new("/a.pdf"), "Disabled").unwrap(), None);
        assert_eq!(source.reads.get(), 0);

        let values = extractor.extract_all_fields(Path::new("/a.pdf")).unwrap();
        assert_eq!(values["Disabled"], None);
    }

    #[test]
    fn test_unreadable_document_is_an_error() {
        let source = MemorySource::new(&[("/a.pdf", "Prim: 1")]);
        let cfg = config(json!({"Prim": {"pattern": "Prim: (\\d+)"}}));
        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);

        assert!(extractor.extract_corpus(&docs(&["/a.pdf", "/broken.pdf"])).is_err());
    }

    #[test]
    fn test_continue_on_error_records_failure() {
        let source = MemorySource::new(&[("/a.pdf", "Prim: 1")]);
        let cfg = config(json!({"Prim": {"pattern": "Prim: (\\d+)"}}));
        let mut extractor =
            PolicyExtractor::new("ak_E", &cfg, &source).with_continue_on_error(true);

        let result = extractor.extract_corpus(&docs(&["/a.pdf", "/broken.pdf"])).unwrap();
        assert_eq!(result.documents, 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].document_id, "broken");
        assert_eq!(result.fields["Prim"]["broken"], None);
        assert_eq!(result.stats["Prim"].successful, 1);
    }

    #[test]
    fn test_interrupt_stops_between_documents() {
        let source = MemorySource::new(&[("/a.pdf", "Prim: 1"), ("/b.pdf", "Prim: 2")]);
        let cfg = config(json!({"Prim": {"pattern": "Prim: (\\d+)"}}));
        let flag = Arc::new(AtomicBool::new(true));
        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source).with_interrupt(flag);

        let result = extractor.extract_corpus(&docs(&["/a.pdf", "/b.pdf"])).unwrap();
        assert!(result.interrupted);
        assert_eq!(result.documents, 0);
        assert!(result.fields["Prim"].is_empty());
    }

    #[test]
    fn test_test_pattern_collects_all() {
        let source = MemorySource::new(&[("/a.pdf", "Teminat: A\nTeminat: B")]);
        let cfg = config(json!({}));
        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);

        let matches = extractor
            .test_pattern(Path::new("/a.pdf"), "teminat: (\\w+)", 1)
            .unwrap();
        assert_eq!(matches, vec!["A", "B"]);
    }

    #[test]
    fn test_save_artifact() {
        let source = MemorySource::new(&[("/a.pdf", "Prim: 1")]);
        let cfg = config(json!({"Prim": {"pattern": "Prim: (\\d+)"}}));
        let mut extractor = PolicyExtractor::new("ak_E", &cfg, &source);
        let result = extractor.extract_corpus(&docs(&["/a.pdf"])).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ak_E.json");
        result.save_artifact(&path).unwrap();

        let loaded = load_artifact(&path).unwrap();
        assert_eq!(loaded["Prim"], json!({"a": "1"}));
    }
}
