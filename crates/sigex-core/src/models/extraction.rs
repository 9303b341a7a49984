//! Per-company extraction configuration and extraction results.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Which part of a match a pattern yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroup", into = "RawGroup")]
pub enum Group {
    /// Capture group by index; 0 is the whole match.
    Index(usize),
    /// Collect every match of the pattern (whole match text).
    All,
}

impl Default for Group {
    fn default() -> Self {
        Group::Index(1)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawGroup {
    Index(usize),
    Name(String),
}

impl TryFrom<RawGroup> for Group {
    type Error = String;

    fn try_from(raw: RawGroup) -> Result<Self, Self::Error> {
        match raw {
            RawGroup::Index(i) => Ok(Group::Index(i)),
            RawGroup::Name(name) if name == "all" => Ok(Group::All),
            RawGroup::Name(name) => Err(format!(
                "group must be a non-negative integer or \"all\", got \"{}\"",
                name
            )),
        }
    }
}

impl From<Group> for RawGroup {
    fn from(group: Group) -> Self {
        match group {
            Group::Index(i) => RawGroup::Index(i),
            Group::All => RawGroup::Name("all".to_string()),
        }
    }
}

/// How a multi-pattern field combines its patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExtractionMode {
    /// Stop at the first pattern that matches.
    #[default]
    First,
    /// Collect every match of every pattern.
    All,
    /// Any other configured value: every pattern is tried, the first hit is kept.
    Other(String),
}

impl From<String> for ExtractionMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "first" => ExtractionMode::First,
            "all" => ExtractionMode::All,
            _ => ExtractionMode::Other(s),
        }
    }
}

impl From<ExtractionMode> for String {
    fn from(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::First => "first".to_string(),
            ExtractionMode::All => "all".to_string(),
            ExtractionMode::Other(s) => s,
        }
    }
}

/// One entry of a multi-pattern field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    /// Bare pattern string, group 1.
    Bare(String),
    /// Pattern with an explicit group.
    Detailed {
        #[serde(default)]
        pattern: String,
        #[serde(default)]
        group: Group,
    },
}

impl PatternSpec {
    pub fn pattern(&self) -> &str {
        match self {
            PatternSpec::Bare(p) => p,
            PatternSpec::Detailed { pattern, .. } => pattern,
        }
    }

    pub fn group(&self) -> Group {
        match self {
            PatternSpec::Bare(_) => Group::default(),
            PatternSpec::Detailed { group, .. } => *group,
        }
    }
}

/// Extraction configuration for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldConfig", into = "RawFieldConfig")]
pub enum FieldExtractionConfig {
    /// `{pattern, group}`
    Single { pattern: String, group: Group },
    /// `{patterns, mode}`
    Multi {
        patterns: Vec<PatternSpec>,
        mode: ExtractionMode,
    },
}

impl FieldExtractionConfig {
    pub fn single(pattern: impl Into<String>, group: Group) -> Self {
        FieldExtractionConfig::Single {
            pattern: pattern.into(),
            group,
        }
    }

    pub fn multi(patterns: Vec<PatternSpec>, mode: ExtractionMode) -> Self {
        FieldExtractionConfig::Multi { patterns, mode }
    }
}

#[derive(Serialize, Deserialize)]
struct RawFieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    patterns: Option<Vec<PatternSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<ExtractionMode>,
}

impl TryFrom<RawFieldConfig> for FieldExtractionConfig {
    type Error = String;

    fn try_from(raw: RawFieldConfig) -> Result<Self, Self::Error> {
        match (raw.pattern, raw.patterns) {
            (Some(pattern), None) => Ok(FieldExtractionConfig::Single {
                pattern,
                group: raw.group.unwrap_or_default(),
            }),
            (None, Some(patterns)) => Ok(FieldExtractionConfig::Multi {
                patterns,
                mode: raw.mode.unwrap_or_default(),
            }),
            (Some(_), Some(_)) => Err("both `pattern` and `patterns` are set".to_string()),
            (None, None) => Err("one of `pattern` or `patterns` is required".to_string()),
        }
    }
}

impl From<FieldExtractionConfig> for RawFieldConfig {
    fn from(config: FieldExtractionConfig) -> Self {
        match config {
            FieldExtractionConfig::Single { pattern, group } => RawFieldConfig {
                pattern: Some(pattern),
                group: Some(group),
                patterns: None,
                mode: None,
            },
            FieldExtractionConfig::Multi { patterns, mode } => RawFieldConfig {
                pattern: None,
                group: None,
                patterns: Some(patterns),
                mode: Some(mode),
            },
        }
    }
}

/// Extraction configuration for a whole company: field name to pattern config.
///
/// A field configured as `null` is kept in the field list and always
/// extracts to null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyExtractionConfig {
    pub company: Option<String>,
    pub version: Option<String>,
    pub fields: BTreeMap<String, Option<FieldExtractionConfig>>,
}

impl CompanyExtractionConfig {
    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_map(raw)
    }

    /// Build a configuration from an already parsed JSON object.
    ///
    /// String values under `company` and `version` are metadata, not fields.
    pub fn from_map(raw: BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        let mut config = CompanyExtractionConfig::default();

        for (name, value) in raw {
            match value {
                Value::String(company) if name == "company" => config.company = Some(company),
                Value::String(version) if name == "version" => config.version = Some(version),
                Value::Null => {
                    config.fields.insert(name, None);
                }
                value => {
                    let field = serde_json::from_value(value)
                        .map_err(|e| ConfigError::invalid(&name, e.to_string()))?;
                    config.fields.insert(name, Some(field));
                }
            }
        }

        Ok(config)
    }

    /// Configured field names, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Value extracted for one field from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    Text(String),
    List(Vec<String>),
}

impl ExtractedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedValue::Text(s) => Some(s),
            ExtractedValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ExtractedValue::Text(_) => None,
            ExtractedValue::List(items) => Some(items),
        }
    }
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedValue::Text(s) => write!(f, "'{}'", s),
            ExtractedValue::List(items) => write!(f, "{:?}", items),
        }
    }
}

/// Extraction outcome for one field and one document; `None` means no match.
pub type ExtractionResult = Option<ExtractedValue>;

/// Raw extraction artifact: field name to document id to result.
pub type RawArtifact = BTreeMap<String, BTreeMap<String, ExtractionResult>>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: Value) -> Result<FieldExtractionConfig, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_single_pattern_defaults_to_group_one() {
        let config = parse(json!({"pattern": "Poliçe No: (\\d+)"})).unwrap();
        assert_eq!(config, FieldExtractionConfig::single("Poliçe No: (\\d+)", Group::Index(1)));
    }

    #[test]
    fn test_group_all() {
        let config = parse(json!({"pattern": "\\d+", "group": "all"})).unwrap();
        assert_eq!(config, FieldExtractionConfig::single("\\d+", Group::All));
        assert!(parse(json!({"pattern": "x", "group": "some"})).is_err());
        assert!(parse(json!({"pattern": "x", "group": -1})).is_err());
    }

    #[test]
    fn test_multi_pattern_entries() {
        let config = parse(json!({
            "patterns": ["A: (\\w+)", {"pattern": "B: \\w+", "group": 0}],
            "mode": "all"
        }))
        .unwrap();

        let FieldExtractionConfig::Multi { patterns, mode } = config else {
            panic!("expected multi-pattern config");
        };
        assert_eq!(mode, ExtractionMode::All);
        assert_eq!(patterns[0].group(), Group::Index(1));
        assert_eq!(patterns[1].pattern(), "B: \\w+");
        assert_eq!(patterns[1].group(), Group::Index(0));
    }

    #[test]
    fn test_multi_pattern_mode_defaults_to_first() {
        let config = parse(json!({"patterns": ["x"]})).unwrap();
        assert_eq!(
            config,
            FieldExtractionConfig::multi(vec![PatternSpec::Bare("x".into())], ExtractionMode::First)
        );
        let other = parse(json!({"patterns": ["x"], "mode": "any"})).unwrap();
        assert_eq!(
            other,
            FieldExtractionConfig::multi(
                vec![PatternSpec::Bare("x".into())],
                ExtractionMode::Other("any".into())
            )
        );
    }

    #[test]
    fn test_exactly_one_pattern_key() {
        assert!(parse(json!({"pattern": "a", "patterns": ["b"]})).is_err());
        assert!(parse(json!({"group": 1})).is_err());
    }

    #[test]
    fn test_company_config_metadata_and_null_fields() {
        let raw: BTreeMap<String, Value> = serde_json::from_value(json!({
            "company": "ak_E",
            "version": "2.1",
            "Police_No": {"pattern": "No: (\\d+)"},
            "Unused": null
        }))
        .unwrap();

        let config = CompanyExtractionConfig::from_map(raw).unwrap();
        assert_eq!(config.company.as_deref(), Some("ak_E"));
        assert_eq!(config.version.as_deref(), Some("2.1"));
        assert_eq!(config.field_names().collect::<Vec<_>>(), vec!["Police_No", "Unused"]);
        assert!(config.fields["Unused"].is_none());
    }

    #[test]
    fn test_invalid_field_names_the_field() {
        let raw: BTreeMap<String, Value> =
            serde_json::from_value(json!({"Prim": {"mode": "all"}})).unwrap();
        let err = CompanyExtractionConfig::from_map(raw).unwrap_err();
        assert!(err.to_string().contains("'Prim'"));
    }

    #[test]
    fn test_missing_file() {
        let err = CompanyExtractionConfig::from_file(Path::new("/nonexistent/ak.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_extracted_value_serializes_untagged() {
        let artifact: RawArtifact = BTreeMap::from([(
            "Teminat".to_string(),
            BTreeMap::from([
                ("doc1".to_string(), Some(ExtractedValue::List(vec!["a".into(), "b".into()]))),
                ("doc2".to_string(), Some(ExtractedValue::Text("x".into()))),
                ("doc3".to_string(), None),
            ]),
        )]);
        assert_eq!(
            serde_json::to_value(&artifact).unwrap(),
            json!({"Teminat": {"doc1": ["a", "b"], "doc2": "x", "doc3": null}})
        );
    }
}
