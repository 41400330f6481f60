// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" cell handling so the rest of the code
// can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

use crate::error::{Result, SalesError};

/// Accepted layouts once `-` separators have been rewritten to `/`, keyed
/// by the shape of the date part. Month-first wins over day-first.
const YEAR_FIRST: &[&str] = &["%Y/%m/%d"];
const YEAR_LAST: &[&str] = &["%m/%d/%Y", "%d/%m/%Y"];
const SHORT_YEAR: &[&str] = &["%m/%d/%y", "%d/%m/%y"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer counterpart of [`parse_f64_safe`]. Spreadsheet exports often write
/// counts as `3.0`, so integral floats are accepted too.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    parse_f64_safe(Some(s))
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

/// Rewrite `-` separators to `/` so mixed exports share one set of layouts.
pub fn repair_date(raw: &str) -> String {
    raw.trim().replace('-', "/")
}

fn date_layouts(date_part: &str) -> &'static [&'static str] {
    let segments: Vec<&str> = date_part.split('/').collect();
    match segments.as_slice() {
        [year, _, _] if year.len() == 4 => YEAR_FIRST,
        [_, _, year] if year.len() == 2 => SHORT_YEAR,
        [_, _, _] => YEAR_LAST,
        _ => &[],
    }
}

/// Parse a raw date cell, returning `None` instead of failing.
///
/// A trailing time of day (`13:45:00`, or ISO `T13:45:00`) is ignored.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = repair_date(s?);
    let date_part = s
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    if date_part.is_empty() {
        return None;
    }
    date_layouts(date_part)
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Strict `YYYY-MM-DD` parsing for user supplied bounds.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| SalesError::InvalidDate(s.trim().to_string()))
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_optional_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn format_optional_f64(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub fn format_optional_i64(v: Option<i64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus thousands separators (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let Ok(int_val) = int_part.parse::<i64>() else {
        // Too large for i64, or not finite.
        return format!("{:.*}", decimals, n);
    };
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
