//! Per-value normalization strategies.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};

use super::amounts::{format_simple_amount, format_turkish_amount, parse_number, NumberFormat};
use super::config::{
    value_to_string, AmountAction, AmountNormalization, AmountTransform, ExtractNormalize,
    FieldMapping, NumericConversion, NumericType, PatternToValue,
};
use crate::error::MappingError;

type Result<T> = std::result::Result<T, MappingError>;

/// Normalize one raw value with the given field mapping.
///
/// Pure: the same value and mapping always produce the same output.
pub fn map_field(value: &Value, mapping: &FieldMapping) -> Result<Value> {
    match mapping {
        FieldMapping::FixedValue { output } => Ok(output.clone()),
        FieldMapping::PatternToValue(cfg) => Ok(map_pattern_to_value(value, cfg)),
        FieldMapping::ExtractNormalize(cfg) => Ok(map_extract_normalize(value, cfg)),
        FieldMapping::AmountNormalization(cfg) => Ok(map_amount(value, cfg)),
        FieldMapping::NumericConversion(cfg) => map_numeric(value, cfg),
        FieldMapping::Unrecognized { .. } => Ok(value.clone()),
    }
}

/// Null, empty string, `false`, zero, and empty containers.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Map list elements in order and keep the first result `accept` allows.
fn first_accepted<T>(
    items: &[Value],
    mut map: impl FnMut(&Value) -> Result<T>,
    accept: impl Fn(&T) -> bool,
) -> Result<Option<T>> {
    for item in items {
        let mapped = map(item)?;
        if accept(&mapped) {
            return Ok(Some(mapped));
        }
    }
    Ok(None)
}

fn default_or(default: &Option<Value>, value: &Value) -> Value {
    default.clone().unwrap_or_else(|| value.clone())
}

fn map_pattern_to_value(value: &Value, cfg: &PatternToValue) -> Value {
    if value.is_null() {
        return cfg
            .rules
            .iter()
            .find(|rule| rule.matches_null())
            .map(|rule| rule.output.clone())
            .unwrap_or_else(|| cfg.default.clone().unwrap_or(Value::Null));
    }
    if is_falsy(value) {
        return default_or(&cfg.default, value);
    }

    let fallback = default_or(&cfg.default, value);
    if let Value::Array(items) = value {
        let hit = first_accepted(
            items,
            |item| Ok(map_pattern_to_value(item, cfg)),
            |mapped| *mapped != fallback,
        );
        return hit.ok().flatten().unwrap_or(fallback);
    }

    let text = value_to_string(value);
    cfg.rules
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.output.clone())
        .unwrap_or(fallback)
}

fn map_extract_normalize(value: &Value, cfg: &ExtractNormalize) -> Value {
    if is_falsy(value) {
        return cfg.default.clone();
    }

    let working = match value {
        Value::Array(items) => match pick_from_items(items, cfg) {
            Some(picked) if !picked.is_empty() => picked,
            _ => return cfg.default.clone(),
        },
        other => value_to_string(other),
    };

    cfg.mappings
        .iter()
        .find(|(input, _)| *input == working)
        .map(|(_, output)| output.clone())
        .unwrap_or_else(|| cfg.default.clone())
}

/// Collect every extract-pattern capture over the list; the largest all-digit
/// value wins, otherwise the first capture.
fn pick_from_items(items: &[Value], cfg: &ExtractNormalize) -> Option<String> {
    let mut collected = Vec::new();
    for item in items {
        let text = value_to_string(item);
        for pattern in &cfg.extract_patterns {
            if let Some(m) = pattern
                .regex
                .captures(&text)
                .and_then(|caps| caps.get(pattern.group))
            {
                collected.push(m.as_str().to_string());
            }
        }
    }

    let largest = collected
        .iter()
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|v| v.parse::<u128>().ok())
        .max();

    match largest {
        Some(n) => Some(n.to_string()),
        None => collected.into_iter().next(),
    }
}

fn map_amount(value: &Value, cfg: &AmountNormalization) -> Value {
    if is_falsy(value) {
        return cfg
            .default
            .clone()
            .unwrap_or_else(|| Value::String(String::new()));
    }

    let hit = match value {
        Value::Array(items) => first_accepted(items, |item| Ok(amount_rule_hit(item, cfg)), Option::is_some)
            .ok()
            .flatten()
            .flatten(),
        other => amount_rule_hit(other, cfg),
    };

    hit.unwrap_or_else(|| default_or(&cfg.default, &Value::String(value_to_string(value))))
}

/// The first matching amount rule's output, if any rule matches.
fn amount_rule_hit(value: &Value, cfg: &AmountNormalization) -> Option<Value> {
    let text = value_to_string(value);
    cfg.rules.iter().find_map(|rule| {
        let caps = rule.regex.captures(&text)?;
        let output = match &rule.action {
            AmountAction::Literal(output) => output.clone(),
            AmountAction::Transform(transform) => {
                let captured = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let formatted = match transform {
                    AmountTransform::TurkishAmount => format_turkish_amount(captured),
                    AmountTransform::SimpleAmount => format_simple_amount(captured),
                };
                Value::String(formatted)
            }
        };
        Some(output)
    })
}

fn map_numeric(value: &Value, cfg: &NumericConversion) -> Result<Value> {
    let fallback = || cfg.default.clone().unwrap_or(Value::Null);
    if is_falsy(value) {
        return Ok(fallback());
    }

    let converted = match value {
        Value::Array(items) => first_accepted(
            items,
            |item| Ok(convert_numeric(item, cfg).ok().flatten()),
            |mapped| mapped.as_ref().is_some_and(|v| !v.is_null()),
        )?
        .flatten(),
        other => convert_numeric(other, cfg)?,
    };
    Ok(converted.unwrap_or_else(fallback))
}

/// Explicit rules, then locale-aware parsing, then a plain float parse.
/// `None` when nothing converts.
fn convert_numeric(value: &Value, cfg: &NumericConversion) -> Result<Option<Value>> {
    if is_falsy(value) {
        return Ok(None);
    }
    let text = value_to_string(value);
    let trimmed = text.trim();

    if let Some(rule) = cfg
        .rules
        .iter()
        .find(|rule| rule.input_pattern.trim() == trimmed)
    {
        if rule.output.is_number() {
            return Ok(Some(rule.output.clone()));
        }
        if cfg.turkish_format == Some(true) {
            if let Some(parsed) = parse_number(&rule.input_pattern, NumberFormat::Turkish) {
                let parsed = match cfg.output_type {
                    NumericType::Integer => parsed.trunc(),
                    NumericType::Float => parsed,
                };
                let scaled = parsed
                    .checked_mul(rule.multiplier)
                    .ok_or_else(|| MappingError::Overflow(rule.input_pattern.clone()))?;
                return decimal_to_value(scaled, cfg.output_type).map(Some);
            }
        }
        return Ok(Some(coerce_output(&rule.output, cfg.output_type)));
    }

    if let Some(parsed) = parse_number(trimmed, NumberFormat::from(cfg.turkish_format)) {
        return decimal_to_value(parsed, cfg.output_type).map(Some);
    }

    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => float_to_value(number, cfg.output_type).map(Some),
        _ => Ok(None),
    }
}

/// Coerce a non-numeric rule output to the target type, or return it unchanged.
fn coerce_output(output: &Value, output_type: NumericType) -> Value {
    let Value::String(s) = output else {
        return output.clone();
    };
    let s = s.trim();
    let coerced = match output_type {
        NumericType::Integer => s.parse::<i64>().ok().map(Value::from),
        NumericType::Float => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
    };
    coerced.unwrap_or_else(|| output.clone())
}

fn decimal_to_value(number: Decimal, output_type: NumericType) -> Result<Value> {
    let overflow = || MappingError::Overflow(number.to_string());
    match output_type {
        NumericType::Integer => number.trunc().to_i64().map(Value::from).ok_or_else(overflow),
        NumericType::Float => number
            .to_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(overflow),
    }
}

fn float_to_value(number: f64, output_type: NumericType) -> Result<Value> {
    match output_type {
        NumericType::Integer => {
            let truncated = number.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(MappingError::Overflow(number.to_string()));
            }
            Ok(Value::from(truncated as i64))
        }
        NumericType::Float => Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| MappingError::Overflow(number.to_string())),
    }
}
