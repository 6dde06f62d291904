//! Rule-based token location and normalization for payment-guide reports.

pub mod amounts;
pub mod fields;
pub mod patterns;

pub use amounts::{format_brl, is_monetary_shape, is_valid_decimal, normalize, strip_currency, RawValue};
pub use fields::{CurrencyAmountExtractor, LabeledAmountExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A substring located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Matched text.
    pub value: String,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset where the match ends.
    pub end: usize,
}

impl FieldMatch {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            start,
            end,
        }
    }
}
