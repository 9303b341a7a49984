//! Applies a company mapping configuration to a whole raw extraction artifact.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::config::{FieldMapping, MappingConfig};
use super::engine::map_field;
use crate::error::{MappingError, Result};

/// Reserved key holding provenance in a mapped artifact.
pub const METADATA_KEY: &str = "_mapping_metadata";

/// Maps raw extraction results to normalized values.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    config: MappingConfig,
}

/// Mapped artifact: field -> document id -> normalized value, plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedArtifact {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    #[serde(rename = "_mapping_metadata")]
    pub metadata: MappingMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingMetadata {
    pub company: String,
    pub config_version: String,
    pub processing_stats: MappingStats,
    /// Local time, ISO 8601.
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingStats {
    pub total_fields: usize,
    pub mapped_fields: usize,
    pub errors: Vec<String>,
}

impl MappingEngine {
    pub fn new(config: MappingConfig) -> Self {
        Self { config }
    }

    /// Load and validate the mapping configuration at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(MappingConfig::from_file(path)?))
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Map one value of `field`. Fields without a mapping pass through.
    pub fn map_field(&self, field: &str, value: &Value) -> std::result::Result<Value, MappingError> {
        match self.config.field(field) {
            Some(mapping) => map_field(value, mapping),
            None => Ok(value.clone()),
        }
    }

    /// Map every field of a raw artifact. A failing field keeps its original
    /// data and is recorded in the stats.
    pub fn map_corpus(&self, raw: &BTreeMap<String, Value>) -> MappedArtifact {
        let mut stats = MappingStats::default();
        let mut fields = BTreeMap::new();
        let mut warned = BTreeSet::new();

        for (name, data) in raw.iter().filter(|(name, _)| name.as_str() != METADATA_KEY) {
            stats.total_fields += 1;

            if let Some(FieldMapping::Unrecognized { kind }) = self.config.field(name) {
                if warned.insert(name.clone()) {
                    warn!("Unknown mapping type '{}' for field '{}', passing values through", kind, name);
                }
            }

            match self.map_documents(name, data) {
                Ok(mapped) => {
                    fields.insert(name.clone(), Value::Object(mapped));
                    stats.mapped_fields += 1;
                }
                Err(e) => {
                    let message = format!("Error mapping field '{}': {}", name, e);
                    warn!("{}", message);
                    stats.errors.push(message);
                    fields.insert(name.clone(), data.clone());
                }
            }
        }

        debug!(
            "Mapped {}/{} fields for {}",
            stats.mapped_fields, stats.total_fields, self.config.company
        );

        MappedArtifact {
            fields,
            metadata: MappingMetadata {
                company: self.config.company.clone(),
                config_version: self.config.version.clone(),
                processing_stats: stats,
                timestamp: chrono::Local::now()
                    .naive_local()
                    .format("%Y-%m-%dT%H:%M:%S%.6f")
                    .to_string(),
            },
        }
    }

    fn map_documents(
        &self,
        name: &str,
        data: &Value,
    ) -> std::result::Result<Map<String, Value>, MappingError> {
        let documents = data.as_object().ok_or_else(|| MappingError::NotAnObject {
            field: name.to_string(),
        })?;
        documents
            .iter()
            .map(|(doc_id, value)| Ok((doc_id.clone(), self.map_field(name, value)?)))
            .collect()
    }

    /// Read a raw artifact, map it, and write the mapped artifact.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<MappedArtifact> {
        let content = fs::read_to_string(input)?;
        let raw: BTreeMap<String, Value> = serde_json::from_str(&content)?;

        let mapped = self.map_corpus(&raw);

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, serde_json::to_string_pretty(&mapped)?)?;

        let stats = &mapped.metadata.processing_stats;
        info!(
            "Mapping completed for {}: {}/{} fields, output saved to {}",
            self.config.company,
            stats.mapped_fields,
            stats.total_fields,
            output.display()
        );
        if !stats.errors.is_empty() {
            warn!("{} errors encountered", stats.errors.len());
        }

        Ok(mapped)
    }
}
