//! Canonical forms for text and numeric fields.
//!
//! None of these functions fail: unparseable input yields `None` (or an
//! empty string) and the caller decides what that means.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::inventory::FieldValue;

/// Strip diacritics, lowercase, and drop hyphens and whitespace.
///
/// `"Branco Pérola"` and `"branco-perola"` both become `"brancoperola"`.
pub fn normalize_text(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Parse a price such as `"R$ 12.345,67"`.
///
/// `.` is treated as a thousands separator and `,` as the decimal mark.
pub fn parse_price_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

pub fn parse_price(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Int(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f).filter(|f| f.is_finite()),
        FieldValue::Text(s) => parse_price_text(s),
    }
}

/// Parse `"YYYY"` or `"YYYY/YYYY"`, keeping the first segment.
pub fn parse_year_text(s: &str) -> Option<i32> {
    s.trim().split('/').next()?.trim().parse::<i32>().ok()
}

pub fn parse_year(value: &FieldValue) -> Option<i32> {
    match value {
        FieldValue::Int(i) => i32::try_from(*i).ok(),
        FieldValue::Float(f) if f.is_finite() && f.fract() == 0.0 => i32::try_from(*f as i64).ok(),
        FieldValue::Float(_) => None,
        FieldValue::Text(s) => parse_year_text(s),
    }
}

/// Parse a mileage such as `"45.000"` or `"45,000"`.
pub fn parse_mileage_text(s: &str) -> Option<i64> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != '.' && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<i64>().ok()
}

pub fn parse_mileage(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int(i) => Some(*i),
        FieldValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        FieldValue::Float(_) => None,
        FieldValue::Text(s) => parse_mileage_text(s),
    }
}

/// Split a comma-separated filter value into its alternatives.
pub fn split_multi_value(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// All words of all alternatives, pooled.
pub fn split_words(value: &str) -> Vec<String> {
    split_multi_value(value)
        .iter()
        .flat_map(|alt| alt.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect()
}
