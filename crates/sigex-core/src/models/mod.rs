//! Configuration and artifact data models.

pub mod config;
pub mod extraction;

pub use config::{ExtractionSettings, PathsConfig, SigexSettings};
pub use extraction::{
    CompanyExtractionConfig, ExtractedValue, ExtractionMode, ExtractionResult,
    FieldExtractionConfig, Group, PatternSpec, RawArtifact,
};
