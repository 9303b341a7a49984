//! Common regex patterns for value normalization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Any run of whitespace, including newlines left over from PDF text
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Zero kuruş at the end of a Turkish amount ("1.234,00")
    pub static ref TRAILING_ZERO_DECIMALS: Regex = Regex::new(r",00$").unwrap();
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Remove all whitespace.
pub fn strip_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, "").into_owned()
}
