//! Pattern extraction engine: applies one field's regex configuration to a document's text.

use regex::{Captures, Regex};
use tracing::warn;

use crate::models::extraction::{
    ExtractedValue, ExtractionMode, ExtractionResult, FieldExtractionConfig, Group,
};
use crate::pattern::PatternOptions;

/// Compiles field configurations and runs them against document text.
///
/// Patterns that fail to compile are reported once and then behave as
/// "no match".
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEngine {
    options: PatternOptions,
}

/// A configured pattern after compilation; `regex` is `None` if it failed to compile.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Option<Regex>,
    group: usize,
}

/// A field configuration ready to run against many documents.
#[derive(Debug, Clone)]
pub enum CompiledField {
    /// Single pattern yielding one capture group.
    Single(CompiledPattern),
    /// Single pattern with `group: "all"`.
    CollectAll(CompiledPattern),
    /// Ordered fallback / collection over several patterns.
    Multi {
        patterns: Vec<CompiledPattern>,
        mode: ExtractionMode,
    },
}

impl PatternEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compiled-program budget for every pattern.
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.options = self.options.with_size_limit(size_limit);
        self
    }

    /// Compile a pattern for later use with a given group.
    pub fn compile_pattern(&self, pattern: &str, group: usize) -> CompiledPattern {
        let regex = match self.options.compile(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Invalid pattern {:?} treated as no match: {}", pattern, e);
                None
            }
        };
        CompiledPattern { regex, group }
    }

    /// Compile a whole field configuration.
    ///
    /// Empty pattern strings in a multi-pattern list are skipped. A
    /// `group: "all"` inside a multi-pattern list yields the whole match.
    pub fn compile_field(&self, config: &FieldExtractionConfig) -> CompiledField {
        match config {
            FieldExtractionConfig::Single {
                pattern,
                group: Group::All,
            } => CompiledField::CollectAll(self.compile_pattern(pattern, 0)),
            FieldExtractionConfig::Single {
                pattern,
                group: Group::Index(group),
            } => CompiledField::Single(self.compile_pattern(pattern, *group)),
            FieldExtractionConfig::Multi { patterns, mode } => CompiledField::Multi {
                patterns: patterns
                    .iter()
                    .filter(|spec| !spec.pattern().is_empty())
                    .map(|spec| {
                        let group = match spec.group() {
                            Group::Index(i) => i,
                            Group::All => 0,
                        };
                        self.compile_pattern(spec.pattern(), group)
                    })
                    .collect(),
                mode: mode.clone(),
            },
        }
    }

    /// Extract one field from `text`.
    pub fn extract_field(&self, text: &str, config: &FieldExtractionConfig) -> ExtractionResult {
        self.compile_field(config).extract(text)
    }

    /// First match of `pattern`, resolved to `group` and trimmed.
    pub fn extract_single(&self, text: &str, pattern: &str, group: usize) -> Option<String> {
        self.compile_pattern(pattern, group).first(text)
    }

    /// Every non-overlapping match of `pattern`, resolved to `group`; empty results are skipped.
    pub fn extract_all_matches(&self, text: &str, pattern: &str, group: usize) -> Vec<String> {
        self.compile_pattern(pattern, group).all(text)
    }
}

impl CompiledPattern {
    /// Whether the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// First match resolved to this pattern's group.
    pub fn first(&self, text: &str) -> Option<String> {
        let regex = self.regex.as_ref()?;
        let caps = regex.captures(text)?;
        resolve_group(&caps, self.group)
    }

    /// All matches resolved to this pattern's group, skipping empty ones.
    pub fn all(&self, text: &str) -> Vec<String> {
        let Some(regex) = self.regex.as_ref() else {
            return Vec::new();
        };
        regex
            .captures_iter(text)
            .filter_map(|caps| resolve_group(&caps, self.group))
            .filter(|value| !value.is_empty())
            .collect()
    }
}

impl CompiledField {
    /// Run this field against a document's text.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        match self {
            CompiledField::Single(pattern) => pattern.first(text).map(ExtractedValue::Text),
            CompiledField::CollectAll(pattern) => Some(ExtractedValue::List(pattern.all(text))),
            CompiledField::Multi {
                patterns,
                mode: ExtractionMode::All,
            } => {
                let matches: Vec<String> = patterns.iter().flat_map(|p| p.all(text)).collect();
                if matches.is_empty() {
                    None
                } else {
                    Some(ExtractedValue::List(matches))
                }
            }
            CompiledField::Multi { patterns, mode } => {
                let stop_at_first = *mode == ExtractionMode::First;
                let mut first_hit = None;
                for pattern in patterns {
                    let Some(hit) = pattern.first(text).filter(|v| !v.is_empty()) else {
                        continue;
                    };
                    if first_hit.is_none() {
                        first_hit = Some(hit);
                    }
                    if stop_at_first {
                        break;
                    }
                }
                first_hit.map(ExtractedValue::Text)
            }
        }
    }
}

/// Group 0 is the whole match. A higher group that did not participate, or
/// matched the empty string, yields `None`, as does a group the pattern lacks.
fn resolve_group(caps: &Captures<'_>, group: usize) -> Option<String> {
    if group == 0 {
        return caps.get(0).map(|m| m.as_str().trim().to_string());
    }
    if group >= caps.len() {
        return None;
    }
    caps.get(group)
        .filter(|m| !m.as_str().is_empty())
        .map(|m| m.as_str().trim().to_string())
}
