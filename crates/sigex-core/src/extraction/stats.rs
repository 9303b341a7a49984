//! Per-field extraction statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success counts for one field across a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Documents with a non-null value.
    pub successful: usize,
    /// Documents processed.
    pub total: usize,
    /// `successful / total * 100`, 0 for an empty corpus.
    pub success_rate: f64,
}

/// Quality band of a field relative to the success threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Ok,
    Warn,
    Fail,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldStatus::Ok => write!(f, "[OK]"),
            FieldStatus::Warn => write!(f, "[WARN]"),
            FieldStatus::Fail => write!(f, "[FAIL]"),
        }
    }
}

impl FieldStats {
    pub fn new(successful: usize, total: usize) -> Self {
        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            successful,
            total,
            success_rate,
        }
    }

    /// Count successes from per-document "has a value" flags.
    pub fn from_presence(present: impl IntoIterator<Item = bool>) -> Self {
        let (successful, total) = present
            .into_iter()
            .fold((0, 0), |(ok, n), has| (ok + usize::from(has), n + 1));
        Self::new(successful, total)
    }

    pub fn status(&self, threshold: f64) -> FieldStatus {
        if self.success_rate >= threshold {
            FieldStatus::Ok
        } else if self.success_rate > 0.0 {
            FieldStatus::Warn
        } else {
            FieldStatus::Fail
        }
    }
}

impl fmt::Display for FieldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}% ({}/{})", self.success_rate, self.successful, self.total)
    }
}

/// Field statistics for a whole artifact, plus the overall completion figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    pub fields: BTreeMap<String, FieldStats>,
    pub threshold: f64,
}

impl ExtractionSummary {
    pub fn new(fields: BTreeMap<String, FieldStats>, threshold: f64) -> Self {
        Self { fields, threshold }
    }

    /// Summarize any artifact shaped `field -> document -> value`.
    ///
    /// Keys starting with `_` are metadata and skipped, as are fields whose
    /// data is not an object.
    pub fn from_artifact(artifact: &BTreeMap<String, Value>, threshold: f64) -> Self {
        let fields = artifact
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .filter_map(|(name, data)| {
                let docs = data.as_object()?;
                let stats = FieldStats::from_presence(docs.values().map(|v| !v.is_null()));
                Some((name.clone(), stats))
            })
            .collect();
        Self::new(fields, threshold)
    }

    /// Fields sorted by success rate, best first.
    pub fn ranked(&self) -> Vec<(&str, &FieldStats)> {
        let mut ranked: Vec<_> = self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
        ranked.sort_by(|a, b| b.1.success_rate.total_cmp(&a.1.success_rate));
        ranked
    }

    /// Fields at or above the threshold.
    pub fn working_fields(&self) -> usize {
        self.fields
            .values()
            .filter(|s| s.status(self.threshold) == FieldStatus::Ok)
            .count()
    }

    /// Share of working fields, in percent.
    pub fn completion_rate(&self) -> f64 {
        FieldStats::new(self.working_fields(), self.fields.len()).success_rate
    }
}
