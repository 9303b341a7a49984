//! Compilation of company-authored regular expressions.

use regex::{Regex, RegexBuilder};

/// Default compiled-program budget for one company pattern (10 MiB).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Flags and limits applied when compiling a configured pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    pub case_insensitive: bool,
    pub dot_matches_new_line: bool,
    pub size_limit: usize,
}

impl PatternOptions {
    /// Options for document extraction patterns: case-insensitive, `.` matches `\n`.
    pub fn extraction() -> Self {
        Self {
            case_insensitive: true,
            dot_matches_new_line: true,
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    /// Options for mapping rule patterns: exact case, line-local `.`.
    pub fn plain() -> Self {
        Self {
            case_insensitive: false,
            dot_matches_new_line: false,
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    pub fn with_case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Compile `pattern` with these options.
    pub fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.case_insensitive)
            .dot_matches_new_line(self.dot_matches_new_line)
            .size_limit(self.size_limit)
            .build()
    }
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::extraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_options() {
        let re = PatternOptions::extraction().compile(r"poliçe no:(.*)bitiş").unwrap();
        assert!(re.is_match("POLIÇE NO: 123\n\nBITIŞ"));
    }

    #[test]
    fn test_plain_options_are_case_sensitive() {
        let re = PatternOptions::plain().compile("TL").unwrap();
        assert!(!re.is_match("tl"));
    }

    #[test]
    fn test_size_limit_rejects_huge_programs() {
        let opts = PatternOptions::plain().with_size_limit(64);
        assert!(opts.compile(r"\w{1000}").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternOptions::extraction().compile("(unclosed").is_err());
    }
}
