//! Monetary token normalization for Brazilian-formatted reports.
//!
//! [`normalize`] is total: every input maps to a finite, non-negative
//! [`Decimal`], with zero standing in for anything that cannot be read.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::patterns::{CURRENCY_SYMBOLS, MONETARY_SHAPE};

/// A value handed to the normalizer: absent, already numeric, or text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Absent,
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(value: &'a str) -> Self {
        RawValue::Text(value)
    }
}

impl<'a> From<&'a String> for RawValue<'a> {
    fn from(value: &'a String) -> Self {
        RawValue::Text(value.as_str())
    }
}

impl From<i64> for RawValue<'_> {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<i32> for RawValue<'_> {
    fn from(value: i32) -> Self {
        RawValue::Integer(value.into())
    }
}

impl From<f64> for RawValue<'_> {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<Decimal> for RawValue<'_> {
    fn from(value: Decimal) -> Self {
        RawValue::Decimal(value)
    }
}

impl<'a, T: Into<RawValue<'a>>> From<Option<T>> for RawValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Absent, Into::into)
    }
}

/// Convert a raw token into a monetary amount. Never fails: absent, empty,
/// unparseable, non-finite and negative inputs all yield zero.
///
/// The result is not rounded; rounding applies to summed totals only.
pub fn normalize<'a>(value: impl Into<RawValue<'a>>) -> Decimal {
    let amount = match value.into() {
        RawValue::Absent => None,
        RawValue::Text(text) => parse_text(text),
        RawValue::Integer(n) => Some(Decimal::from(n)),
        RawValue::Float(f) => Decimal::from_f64(f),
        RawValue::Decimal(d) => Some(d),
    };

    match amount {
        Some(d) if d.is_sign_negative() => Decimal::ZERO,
        Some(d) => d,
        None => Decimal::ZERO,
    }
}

/// True when the value is numeric and representable (not NaN or infinite).
pub fn is_valid_decimal<'a>(value: impl Into<RawValue<'a>>) -> bool {
    match value.into() {
        RawValue::Integer(_) | RawValue::Decimal(_) => true,
        RawValue::Float(f) => f.is_finite(),
        RawValue::Absent | RawValue::Text(_) => false,
    }
}

/// Remove leading currency symbols and surrounding whitespace.
pub fn strip_currency(value: &str) -> &str {
    let mut rest = value.trim();
    'outer: loop {
        for symbol in CURRENCY_SYMBOLS {
            if let Some(stripped) = rest.strip_prefix(symbol) {
                rest = stripped.trim_start();
                continue 'outer;
            }
        }
        return rest;
    }
}

/// Check that a token looks like an amount: once currency symbols and
/// whitespace are gone, only digits, `.` and `,` remain.
pub fn is_monetary_shape(value: &str) -> bool {
    MONETARY_SHAPE.is_match(strip_currency(value))
}

/// Apply the separator rules and parse.
///
/// Both `.` and `,` present: `.` groups thousands, `,` is the decimal mark.
/// Only `,`: decimal mark. Only `.` or neither: already canonical.
fn parse_text(text: &str) -> Option<Decimal> {
    let cleaned = strip_currency(text);
    if cleaned.is_empty() {
        return None;
    }

    let canonical = match (cleaned.contains('.'), cleaned.contains(',')) {
        (true, true) => cleaned.replace('.', "").replace(',', "."),
        (false, true) => cleaned.replace(',', "."),
        _ => cleaned.to_string(),
    };

    Decimal::from_str(&canonical)
        .or_else(|_| Decimal::from_scientific(&canonical))
        .ok()
}

/// Format an amount in Brazilian style (R$ 1.234,56).
pub fn format_brl(amount: Decimal) -> String {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sign, formatted, decimal_part)
}
