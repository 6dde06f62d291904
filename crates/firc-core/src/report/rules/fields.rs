//! Locating monetary substrings in report text.

use regex::Regex;

use super::patterns::{label_pattern, AMOUNT_PAID_LABEL, AMOUNT_PAID_LABEL_EN, CURRENCY_AMOUNT};
use super::{FieldExtractor, FieldMatch};

/// Finds every `R$`-prefixed amount, left to right.
pub struct CurrencyAmountExtractor;

impl CurrencyAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyAmountExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| FieldMatch::new(m.as_str(), m.start(), m.end()))
            .collect()
    }
}

/// Finds values introduced by one of a set of labels ("Valor Pago: ...").
pub struct LabeledAmountExtractor {
    patterns: Vec<Regex>,
}

impl LabeledAmountExtractor {
    /// Extractor for the default "Valor Pago" and "Amount Paid" labels.
    pub fn new() -> Self {
        Self {
            patterns: vec![AMOUNT_PAID_LABEL.clone(), AMOUNT_PAID_LABEL_EN.clone()],
        }
    }

    /// Extractor for custom labels.
    pub fn with_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, regex::Error> {
        let patterns = labels
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .map(label_pattern)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl Default for LabeledAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LabeledAmountExtractor {
    type Output = FieldMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut matches: Vec<FieldMatch> = self
            .patterns
            .iter()
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| FieldMatch::new(m.as_str().trim(), m.start(), m.end()))
            .collect();

        // Overlapping labels report one value per position
        matches.sort_by_key(|m| m.start);
        matches.dedup_by_key(|m| m.start);
        matches
    }
}
