//! Field extraction from document text.

mod engine;
mod extractor;
pub mod stats;

pub use engine::{CompiledField, CompiledPattern, PatternEngine};
pub use extractor::{load_artifact, CorpusExtraction, DocumentFailure, PolicyExtractor};
pub use stats::{ExtractionSummary, FieldStats, FieldStatus};
