//! Mapping configuration: per-field normalization rules, validated at load time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use crate::error::ConfigError;
use crate::pattern::PatternOptions;

/// A company's mapping configuration.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    pub company: String,
    pub version: String,
    pub fields: BTreeMap<String, FieldMapping>,
}

/// Normalization strategy for one field.
#[derive(Debug, Clone)]
pub enum FieldMapping {
    /// Always the configured output.
    FixedValue { output: Value },
    /// Case-insensitive substring rules.
    PatternToValue(PatternToValue),
    /// Pick a value out of list items, then map it exactly.
    ExtractNormalize(ExtractNormalize),
    /// Regex rules producing literal or reformatted amounts.
    AmountNormalization(AmountNormalization),
    /// Conversion to an integer or float.
    NumericConversion(NumericConversion),
    /// A `type` this version does not know; values pass through unchanged.
    Unrecognized { kind: String },
}

#[derive(Debug, Clone)]
pub struct PatternToValue {
    pub rules: Vec<PatternRule>,
    /// `None` when the key is absent, `Some(Null)` for an explicit null.
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    /// `None` (or the string `"null"`) matches a null input.
    pub input_pattern: Option<String>,
    pub output: Value,
    matcher: Option<SubstringMatcher>,
}

/// Case-insensitive substring test, first on collapsed then on stripped whitespace.
#[derive(Debug, Clone)]
struct SubstringMatcher {
    collapsed: Regex,
    compressed: Regex,
}

#[derive(Debug, Clone)]
pub struct ExtractNormalize {
    pub extract_patterns: Vec<ExtractPattern>,
    pub mappings: Vec<(String, Value)>,
    pub default: Value,
}

#[derive(Debug, Clone)]
pub struct ExtractPattern {
    pub regex: Regex,
    pub group: usize,
}

#[derive(Debug, Clone)]
pub struct AmountNormalization {
    pub rules: Vec<AmountRule>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct AmountRule {
    pub regex: Regex,
    pub action: AmountAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AmountAction {
    /// Return this value as-is.
    Literal(Value),
    /// Reformat capture group 1.
    Transform(AmountTransform),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountTransform {
    /// `format_turkish_amount`
    TurkishAmount,
    /// `format_simple_amount`
    SimpleAmount,
}

#[derive(Debug, Clone)]
pub struct NumericConversion {
    pub rules: Vec<NumericRule>,
    pub output_type: NumericType,
    /// Explicit number format; `None` means auto-detect.
    pub turkish_format: Option<bool>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct NumericRule {
    pub input_pattern: String,
    pub output: Value,
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    #[default]
    Integer,
    Float,
}

// Raw file shapes

#[derive(Deserialize)]
struct RawMappingFile {
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    version: Option<Value>,
    field_mappings: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawFixedValue {
    output: Value,
}

#[derive(Deserialize)]
struct RawPatternToValue {
    #[serde(default)]
    mappings: Vec<RawPatternRule>,
    #[serde(default, deserialize_with = "present")]
    default: Option<Value>,
}

#[derive(Deserialize)]
struct RawPatternRule {
    #[serde(default)]
    input_pattern: Option<String>,
    output: Value,
}

#[derive(Deserialize)]
struct RawExtractNormalize {
    #[serde(default)]
    extract_patterns: Vec<RawExtractPattern>,
    #[serde(default)]
    mappings: Vec<RawExactRule>,
    #[serde(default, deserialize_with = "present")]
    default: Option<Value>,
}

#[derive(Deserialize)]
struct RawExtractPattern {
    pattern: String,
    #[serde(default)]
    group: usize,
}

#[derive(Deserialize)]
struct RawExactRule {
    input: Value,
    output: Value,
}

#[derive(Deserialize)]
struct RawAmountNormalization {
    #[serde(default)]
    mappings: Vec<RawAmountRule>,
    #[serde(default, deserialize_with = "present")]
    default: Option<Value>,
}

#[derive(Deserialize)]
struct RawAmountRule {
    pattern: String,
    #[serde(default, deserialize_with = "present")]
    output: Option<Value>,
    #[serde(default)]
    transform: Option<String>,
}

#[derive(Deserialize)]
struct RawNumericConversion {
    #[serde(default)]
    mappings: Vec<RawNumericRule>,
    #[serde(default)]
    output_type: NumericType,
    #[serde(default)]
    turkish_format: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    default: Option<Value>,
}

#[derive(Deserialize)]
struct RawNumericRule {
    #[serde(default)]
    input_pattern: Value,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    multiplier: Option<Number>,
}

/// Distinguishes an explicit `null` (`Some(Null)`) from an absent key (`None`).
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// String form of a JSON value: strings verbatim, everything else as JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl MappingConfig {
    /// Load and validate a mapping configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file_with_options(path, PatternOptions::plain())
    }

    /// Load with explicit regex options (size limit).
    pub fn from_file_with_options(path: &Path, options: PatternOptions) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawMappingFile =
            serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_raw(raw, options)
    }

    /// Validate an already parsed mapping document.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawMappingFile = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid("field_mappings", e.to_string()))?;
        Self::from_raw(raw, PatternOptions::plain())
    }

    fn from_raw(raw: RawMappingFile, options: PatternOptions) -> Result<Self, ConfigError> {
        let fields = raw
            .field_mappings
            .into_iter()
            .map(|(name, value)| {
                let mapping = FieldMapping::parse(&name, value, options)?;
                Ok((name, mapping))
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            company: raw.company.unwrap_or_else(|| "unknown".to_string()),
            version: raw
                .version
                .map(|v| value_to_string(&v))
                .unwrap_or_else(|| "1.0".to_string()),
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }
}

impl FieldMapping {
    /// Validate one `field_mappings` entry.
    pub fn parse(field: &str, value: Value, options: PatternOptions) -> Result<Self, ConfigError> {
        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(ConfigError::invalid(field, "`type` must be a string")),
            None => return Err(ConfigError::invalid(field, "missing `type`")),
        };

        let mapping = match kind.as_str() {
            "fixed_value" => {
                let raw: RawFixedValue = shape(field, value)?;
                FieldMapping::FixedValue { output: raw.output }
            }
            "pattern_to_value" => {
                let raw: RawPatternToValue = shape(field, value)?;
                FieldMapping::PatternToValue(PatternToValue::build(field, raw)?)
            }
            "extract_normalize" => {
                let raw: RawExtractNormalize = shape(field, value)?;
                FieldMapping::ExtractNormalize(ExtractNormalize::build(field, raw, options)?)
            }
            "amount_normalization" => {
                let raw: RawAmountNormalization = shape(field, value)?;
                FieldMapping::AmountNormalization(AmountNormalization::build(field, raw, options)?)
            }
            "numeric_conversion" => {
                let raw: RawNumericConversion = shape(field, value)?;
                FieldMapping::NumericConversion(NumericConversion::build(field, raw)?)
            }
            _ => FieldMapping::Unrecognized { kind },
        };
        Ok(mapping)
    }

    /// The configured `type` name.
    pub fn kind(&self) -> &str {
        match self {
            FieldMapping::FixedValue { .. } => "fixed_value",
            FieldMapping::PatternToValue(_) => "pattern_to_value",
            FieldMapping::ExtractNormalize(_) => "extract_normalize",
            FieldMapping::AmountNormalization(_) => "amount_normalization",
            FieldMapping::NumericConversion(_) => "numeric_conversion",
            FieldMapping::Unrecognized { kind } => kind,
        }
    }
}

fn shape<T: for<'de> Deserialize<'de>>(field: &str, value: Value) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|e| ConfigError::invalid(field, e.to_string()))
}

fn compile(field: &str, pattern: &str, options: PatternOptions) -> Result<Regex, ConfigError> {
    options
        .compile(pattern)
        .map_err(|source| ConfigError::InvalidPattern {
            field: field.to_string(),
            source,
        })
}

impl PatternToValue {
    fn build(field: &str, raw: RawPatternToValue) -> Result<Self, ConfigError> {
        let rules = raw
            .mappings
            .into_iter()
            .map(|rule| {
                let matcher = match rule.input_pattern.as_deref() {
                    Some(pattern) if !pattern.is_empty() => Some(SubstringMatcher::new(field, pattern)?),
                    _ => None,
                };
                Ok(PatternRule {
                    input_pattern: rule.input_pattern,
                    output: rule.output,
                    matcher,
                })
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            rules,
            default: raw.default,
        })
    }
}

impl PatternRule {
    /// Whether this rule maps an explicit null input.
    pub fn matches_null(&self) -> bool {
        matches!(self.input_pattern.as_deref(), None | Some("null"))
    }

    /// Whether the pattern occurs in `value`, ignoring case and whitespace differences.
    pub fn matches(&self, value: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.matches(value))
    }
}

impl SubstringMatcher {
    fn new(field: &str, pattern: &str) -> Result<Self, ConfigError> {
        let options = PatternOptions::plain().with_case_insensitive(true);
        let literal = |s: String| compile(field, &regex::escape(&s), options);
        Ok(Self {
            collapsed: literal(super::patterns::collapse_whitespace(pattern))?,
            compressed: literal(super::patterns::strip_whitespace(pattern))?,
        })
    }

    fn matches(&self, value: &str) -> bool {
        self.collapsed
            .is_match(&super::patterns::collapse_whitespace(value))
            || self
                .compressed
                .is_match(&super::patterns::strip_whitespace(value))
    }
}

impl ExtractNormalize {
    fn build(field: &str, raw: RawExtractNormalize, options: PatternOptions) -> Result<Self, ConfigError> {
        let default = raw.default.ok_or_else(|| {
            ConfigError::invalid(field, "extract_normalize requires an explicit `default`")
        })?;

        let options = options.with_case_insensitive(true);
        let extract_patterns = raw
            .extract_patterns
            .into_iter()
            .map(|p| {
                let regex = compile(field, &p.pattern, options)?;
                if p.group >= regex.captures_len() {
                    return Err(ConfigError::invalid(
                        field,
                        format!("pattern {:?} has no group {}", p.pattern, p.group),
                    ));
                }
                Ok(ExtractPattern {
                    regex,
                    group: p.group,
                })
            })
            .collect::<Result<_, ConfigError>>()?;

        let mappings = raw
            .mappings
            .into_iter()
            .map(|rule| (value_to_string(&rule.input), rule.output))
            .collect();

        Ok(Self {
            extract_patterns,
            mappings,
            default,
        })
    }
}

impl AmountNormalization {
    fn build(field: &str, raw: RawAmountNormalization, options: PatternOptions) -> Result<Self, ConfigError> {
        let rules = raw
            .mappings
            .into_iter()
            .map(|rule| {
                let regex = compile(field, &rule.pattern, options)?;
                let action = match (rule.output, rule.transform.as_deref()) {
                    (Some(output), _) => AmountAction::Literal(output),
                    (None, Some("format_turkish_amount")) => {
                        AmountAction::Transform(AmountTransform::TurkishAmount)
                    }
                    (None, Some("format_simple_amount")) => {
                        AmountAction::Transform(AmountTransform::SimpleAmount)
                    }
                    (None, Some(other)) => {
                        return Err(ConfigError::invalid(field, format!("unknown transform {:?}", other)));
                    }
                    (None, None) => {
                        return Err(ConfigError::invalid(
                            field,
                            format!("rule {:?} needs `output` or `transform`", rule.pattern),
                        ));
                    }
                };
                if matches!(action, AmountAction::Transform(_)) && regex.captures_len() < 2 {
                    return Err(ConfigError::invalid(
                        field,
                        format!("transform pattern {:?} has no capture group", rule.pattern),
                    ));
                }
                Ok(AmountRule { regex, action })
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            rules,
            default: raw.default,
        })
    }
}

impl NumericConversion {
    fn build(field: &str, raw: RawNumericConversion) -> Result<Self, ConfigError> {
        let rules = raw
            .mappings
            .into_iter()
            .map(|rule| {
                let multiplier = match rule.multiplier {
                    None => Decimal::ONE,
                    Some(n) => number_to_decimal(&n).ok_or_else(|| {
                        ConfigError::invalid(field, format!("unusable multiplier {}", n))
                    })?,
                };
                Ok(NumericRule {
                    input_pattern: value_to_string(&rule.input_pattern),
                    output: rule.output,
                    multiplier,
                })
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            rules,
            output_type: raw.output_type,
            turkish_format: raw.turkish_format,
            default: raw.default,
        })
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    n.as_f64().and_then(Decimal::from_f64)
}
