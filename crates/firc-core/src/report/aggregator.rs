//! Summation of normalized tokens into verified totals.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::models::config::AggregationConfig;
use crate::models::report::{Category, ExtractionResult, TotalsResult};

use super::rules::{is_valid_decimal, normalize, RawValue};

/// Sums raw tokens per category.
///
/// Totals are rounded half-to-even once, after summation, and clamped to be
/// non-negative. Nothing here can fail.
#[derive(Debug, Clone)]
pub struct Aggregator {
    decimal_places: u32,
}

impl Aggregator {
    /// Create an aggregator rounding to cents.
    pub fn new() -> Self {
        Self { decimal_places: 2 }
    }

    pub fn from_config(config: &AggregationConfig) -> Self {
        Self::new().with_decimal_places(config.decimal_places)
    }

    /// Set the precision of the reported totals.
    pub fn with_decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places.min(28);
        self
    }

    /// Totals for both categories of an extraction.
    pub fn aggregate(&self, extraction: &ExtractionResult) -> TotalsResult {
        let totals = TotalsResult {
            amount_paid: self.sum(extraction.values(Category::AmountPaid)),
            registry_fee: self.sum(extraction.values(Category::RegistryFee)),
        }
        .validated();

        debug!(
            "Totals: valor_pago={} ({} tokens), cartorio={} ({} tokens)",
            totals.amount_paid,
            extraction.count(Category::AmountPaid),
            totals.registry_fee,
            extraction.count(Category::RegistryFee)
        );

        totals
    }

    /// Totals for arbitrary value sequences (text, numbers or absent values).
    pub fn aggregate_values<'a, A, B>(&self, amount_paid: A, registry_fee: B) -> TotalsResult
    where
        A: IntoIterator,
        A::Item: Into<RawValue<'a>>,
        B: IntoIterator,
        B::Item: Into<RawValue<'a>>,
    {
        TotalsResult {
            amount_paid: self.sum(amount_paid),
            registry_fee: self.sum(registry_fee),
        }
        .validated()
    }

    /// Sum of the valid normalized values, rounded.
    pub fn sum<'a, I>(&self, values: I) -> Decimal
    where
        I: IntoIterator,
        I::Item: Into<RawValue<'a>>,
    {
        let mut total = Decimal::ZERO;

        for value in values {
            let amount = normalize(value);
            if !is_valid_decimal(amount) {
                continue;
            }
            match total.checked_add(amount) {
                Some(sum) => total = sum,
                None => warn!("Skipping {} - total would overflow", amount),
            }
        }

        let rounded =
            total.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointNearestEven);
        if is_valid_decimal(rounded) && rounded >= Decimal::ZERO {
            rounded
        } else {
            Decimal::ZERO
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{RawToken, TokenSource};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extraction(amount_paid: &[&str], registry_fee: &[&str]) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        for (line, value) in amount_paid.iter().enumerate() {
            result.push(
                Category::AmountPaid,
                RawToken::new(*value, 1, TokenSource::TextLine { line }),
            );
        }
        for (line, value) in registry_fee.iter().enumerate() {
            result.push(
                Category::RegistryFee,
                RawToken::new(*value, 1, TokenSource::TextLine { line }),
            );
        }
        result
    }

    #[test]
    fn test_calculate_totals_with_valid_data() {
        let data = extraction(&["301,61", "985,92", "9.151,22"], &["215,44", "713,27", "6.605,64"]);
        let totals = Aggregator::new().aggregate(&data);

        assert_eq!(totals.amount_paid, dec("10438.75"));
        assert_eq!(totals.registry_fee, dec("7534.35"));
    }

    #[test]
    fn test_calculate_totals_with_empty_data() {
        let totals = Aggregator::new().aggregate(&ExtractionResult::new());

        assert_eq!(totals.amount_paid, Decimal::ZERO);
        assert_eq!(totals.registry_fee, Decimal::ZERO);
    }

    #[test]
    fn test_calculate_totals_with_mixed_data() {
        let totals = Aggregator::new().aggregate_values(
            [Some("301,61"), None, Some("985,92"), Some(""), Some("100,00")],
            [Some("215,44"), Some("abc"), Some("713,27")],
        );

        assert_eq!(totals.amount_paid, dec("1387.53"));
        assert_eq!(totals.registry_fee, dec("928.71"));
    }

    #[test]
    fn test_order_does_not_matter() {
        let aggregator = Aggregator::new();
        let forward = aggregator.sum(["0,01", "1.000,10", "33,33", "7"]);
        let backward = aggregator.sum(["7", "33,33", "1.000,10", "0,01"]);

        assert_eq!(forward, backward);
        assert_eq!(forward, dec("1040.44"));
    }

    #[test]
    fn test_numeric_inputs() {
        let aggregator = Aggregator::new();
        assert_eq!(aggregator.sum([100.0, 0.5, f64::NAN]), dec("100.50"));
        assert_eq!(aggregator.sum([dec("1.005"), dec("1.015")]), dec("2.02"));
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        let aggregator = Aggregator::new();
        assert_eq!(aggregator.sum(["0.125"]), dec("0.12"));
        assert_eq!(aggregator.sum(["0.135"]), dec("0.14"));
        assert_eq!(aggregator.with_decimal_places(0).sum(["2.5"]), dec("2"));
    }

    #[test]
    fn test_overflow_skips_addend() {
        let aggregator = Aggregator::new();
        let total = aggregator.sum([Decimal::MAX, Decimal::ONE]);
        assert_eq!(total, Decimal::MAX);
    }
}
