//! Value normalization for raw extraction results.
//!
//! A [`MappingConfig`] holds one [`FieldMapping`] per field, validated when
//! loaded. [`map_field`] applies one mapping to one value and
//! [`MappingEngine`] applies a whole configuration to a raw artifact.

pub mod amounts;
mod config;
mod engine;
mod orchestrator;
pub mod patterns;

pub use amounts::{format_simple_amount, format_turkish_amount, parse_number, NumberFormat};
pub use config::{
    value_to_string, AmountAction, AmountNormalization, AmountRule, AmountTransform,
    ExtractNormalize, ExtractPattern, FieldMapping, MappingConfig, NumericConversion,
    NumericRule, NumericType, PatternRule, PatternToValue,
};
pub use engine::{is_falsy, map_field};
pub use orchestrator::{MappedArtifact, MappingEngine, MappingMetadata, MappingStats, METADATA_KEY};
