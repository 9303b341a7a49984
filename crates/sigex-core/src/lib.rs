//! Core library for insurance policy field extraction.
//!
//! This crate provides:
//! - PDF text extraction behind the [`TextSource`] trait, with a per-run cache
//! - Regex field extraction driven by per-company JSON configurations
//! - Value mapping (fixed values, substring rules, amounts, Turkish/English numbers)
//! - Extraction statistics and insurer detection

pub mod company;
pub mod corpus;
pub mod error;
pub mod extraction;
pub mod mapping;
pub mod models;
pub mod pattern;
pub mod pdf;

pub use company::CompanyDetector;
pub use corpus::{list_documents, Document};
pub use error::{ConfigError, MappingError, PdfError, Result, SigexError};
pub use extraction::{CorpusExtraction, ExtractionSummary, FieldStatus, PatternEngine, PolicyExtractor};
pub use mapping::{FieldMapping, MappedArtifact, MappingConfig, MappingEngine};
pub use models::{CompanyExtractionConfig, ExtractedValue, ExtractionResult, FieldExtractionConfig, SigexSettings};
pub use pattern::PatternOptions;
pub use pdf::{PdfTextExtractor, TextCache, TextSource};
