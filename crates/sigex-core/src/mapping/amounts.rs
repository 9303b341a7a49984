//! Locale-aware number parsing and amount formatting.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::TRAILING_ZERO_DECIMALS;

/// Currency suffixes stripped before parsing, longest first.
const CURRENCY_SUFFIXES: [&str; 6] = [".-TL", " TL", "-TL", "TL", ".-", "-"];

/// Which separator convention a number string uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `.` groups thousands, `,` separates decimals: `2.500.000,75`.
    Turkish,
    /// `,` groups thousands, `.` separates decimals: `2,500,000.75`.
    English,
    /// Guess from the separators present.
    Auto,
}

impl From<Option<bool>> for NumberFormat {
    /// Maps a `turkish_format` flag: unset means auto-detect.
    fn from(turkish_format: Option<bool>) -> Self {
        match turkish_format {
            Some(true) => NumberFormat::Turkish,
            Some(false) => NumberFormat::English,
            None => NumberFormat::Auto,
        }
    }
}

/// Strip one known currency suffix (` TL`, `.-TL`, `-TL`, `TL`, `.-`, `-`).
pub fn strip_currency(s: &str) -> &str {
    let s = s.trim();
    CURRENCY_SUFFIXES
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .map(str::trim)
        .unwrap_or(s)
}

/// Parse a formatted number such as `"2.500.000,75"`, `"1.000.-TL"` or `"500,000.00 TL"`.
///
/// Auto-detection is a heuristic: with both separators present the last one
/// is the decimal separator. A lone `,` always groups thousands. A lone `.`
/// groups thousands unless it occurs once and is not followed by exactly
/// three digits.
pub fn parse_number(s: &str, format: NumberFormat) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() || ["none", "nan", "null"].contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }

    let cleaned = strip_currency(trimmed);
    match format {
        NumberFormat::Turkish => parse_with(cleaned, '.', ','),
        NumberFormat::English => parse_with(cleaned, ',', '.'),
        NumberFormat::Auto => parse_with_detected(cleaned),
    }
}

fn parse_with_detected(s: &str) -> Option<Decimal> {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => parse_with(s, '.', ','),
        (Some(_), Some(_)) => parse_with(s, ',', '.'),
        (None, Some(_)) if implies_decimal(s, '.') => parse_with(s, ',', '.'),
        (None, Some(_)) => parse_with(s, '.', ','),
        (Some(_), None) | (None, None) => parse_with(s, ',', '.'),
    }
}

/// A single `sep` not followed by a three-digit group reads as a decimal point.
fn implies_decimal(s: &str, sep: char) -> bool {
    let mut parts = s.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(tail), None) => tail.len() != 3,
        _ => false,
    }
}

fn parse_with(s: &str, thousands: char, decimal: char) -> Option<Decimal> {
    let (integer, fraction) = match s.rsplit_once(decimal) {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (s, None),
    };

    let integer: String = integer.chars().filter(|c| *c != thousands).collect();
    if !is_digits(&integer) {
        return None;
    }

    match fraction {
        Some(fraction) if is_digits(fraction) => {
            Decimal::from_str(&format!("{}.{}", integer, fraction)).ok()
        }
        Some(_) => None,
        None => Decimal::from_str(&integer).ok(),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `"1.234,00"` -> `" 1,234 "`: drop zero decimals, swap `.` for `,`, pad with spaces.
pub fn format_turkish_amount(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let value = TRAILING_ZERO_DECIMALS.replace(value, "");
    format!(" {} ", value.replace('.', ","))
}

/// `"1.500"` -> `" 1,500 "`: swap `.` for `,`, pad with spaces.
pub fn format_simple_amount(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!(" {} ", value.replace('.', ","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Option<Decimal> {
        Some(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_parse_turkish() {
        assert_eq!(parse_number("2.500.000,75", NumberFormat::Turkish), dec("2500000.75"));
        assert_eq!(parse_number("500.000", NumberFormat::Turkish), dec("500000"));
        assert_eq!(parse_number("1.000.-TL", NumberFormat::Turkish), dec("1000"));
        assert_eq!(parse_number("750.000,00 TL", NumberFormat::Turkish), dec("750000.00"));
        assert_eq!(parse_number("1,2,3", NumberFormat::Turkish), None);
        assert_eq!(parse_number("12,5a", NumberFormat::Turkish), None);
    }

    #[test]
    fn test_parse_english() {
        assert_eq!(parse_number("2,500,000.75", NumberFormat::English), dec("2500000.75"));
        assert_eq!(parse_number("500,000.00 TL", NumberFormat::English), dec("500000.00"));
        assert_eq!(parse_number("250,000", NumberFormat::English), dec("250000"));
        assert_eq!(parse_number("1.2.3", NumberFormat::English), None);
    }

    #[test]
    fn test_parse_auto_last_separator_wins() {
        assert_eq!(parse_number("2.500.000,75", NumberFormat::Auto), dec("2500000.75"));
        assert_eq!(parse_number("2,500,000.75", NumberFormat::Auto), dec("2500000.75"));
    }

    #[test]
    fn test_parse_auto_single_separator() {
        assert_eq!(parse_number("2.500.000", NumberFormat::Auto), dec("2500000"));
        assert_eq!(parse_number("1.234", NumberFormat::Auto), dec("1234"));
        assert_eq!(parse_number("1.5", NumberFormat::Auto), dec("1.5"));
        assert_eq!(parse_number("250,000", NumberFormat::Auto), dec("250000"));
        assert_eq!(parse_number("1500", NumberFormat::Auto), dec("1500"));
    }

    #[test]
    fn test_parse_auto_lone_comma_groups_thousands() {
        assert_eq!(parse_number("12,5", NumberFormat::Auto), dec("125"));
        assert_eq!(parse_number("1,234,567", NumberFormat::Auto), dec("1234567"));
        assert_eq!(parse_number("12,5", NumberFormat::Turkish), dec("12.5"));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        for input in ["", "  ", "null", "NaN", "None", "SINIRSIZ", "TL", "-"] {
            assert_eq!(parse_number(input, NumberFormat::Auto), None, "{input:?}");
        }
    }

    #[test]
    fn test_strip_currency() {
        assert_eq!(strip_currency("1.000.-TL"), "1.000");
        assert_eq!(strip_currency("1.000 TL"), "1.000");
        assert_eq!(strip_currency("1.000-TL"), "1.000");
        assert_eq!(strip_currency("1.000TL"), "1.000");
        assert_eq!(strip_currency("1.000.-"), "1.000");
        assert_eq!(strip_currency("1.000"), "1.000");
    }

    #[test]
    fn test_format_turkish_amount() {
        assert_eq!(format_turkish_amount("1.234,00"), " 1,234 ");
        assert_eq!(format_turkish_amount("2.500.000"), " 2,500,000 ");
        assert_eq!(format_turkish_amount("1.234,50"), " 1,234,50 ");
        assert_eq!(format_turkish_amount(""), "");
    }

    #[test]
    fn test_format_simple_amount() {
        assert_eq!(format_simple_amount("1.500"), " 1,500 ");
        assert_eq!(format_simple_amount("100,00"), " 100,00 ");
    }
}
