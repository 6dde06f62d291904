//! Value types produced by extraction and aggregation.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two monetary figures tracked per report line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Amount actually remitted (`valor_pago`).
    #[serde(rename = "valor_pago")]
    AmountPaid,
    /// Notary/registry-office portion (`cartorio`).
    #[serde(rename = "cartorio")]
    RegistryFee,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::AmountPaid, Category::RegistryFee];

    /// Key used in report records.
    pub fn key(&self) -> &'static str {
        match self {
            Category::AmountPaid => "valor_pago",
            Category::RegistryFee => "cartorio",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where on a page a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenSource {
    /// Cell of a table row (zero-based table and row indexes).
    TableRow { table: usize, row: usize },
    /// `R$` amount on a text line (zero-based line index).
    TextLine { line: usize },
    /// Value following an explicit label (byte offset in the page text).
    LabeledField { offset: usize },
}

impl TokenSource {
    pub fn is_table(&self) -> bool {
        matches!(self, TokenSource::TableRow { .. })
    }
}

/// Page and source a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Page number (1-indexed).
    pub page: u32,
    /// Extraction path on that page.
    pub source: TokenSource,
}

/// A monetary string captured from document content, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    /// Text as it appeared in the document.
    pub value: String,
    /// Origin of the token.
    pub provenance: Provenance,
}

impl RawToken {
    pub fn new(value: impl Into<String>, page: u32, source: TokenSource) -> Self {
        Self {
            value: value.into(),
            provenance: Provenance { page, source },
        }
    }
}

/// Raw tokens per category, in discovery order. Duplicates are kept: repeated
/// entries in a report are separate line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "valor_pago")]
    pub amount_paid: Vec<RawToken>,
    #[serde(rename = "cartorio")]
    pub registry_fee: Vec<RawToken>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, token: RawToken) {
        match category {
            Category::AmountPaid => self.amount_paid.push(token),
            Category::RegistryFee => self.registry_fee.push(token),
        }
    }

    /// Tokens collected for a category.
    pub fn tokens(&self, category: Category) -> &[RawToken] {
        match category {
            Category::AmountPaid => &self.amount_paid,
            Category::RegistryFee => &self.registry_fee,
        }
    }

    /// Raw strings collected for a category.
    pub fn values(&self, category: Category) -> impl Iterator<Item = &str> {
        self.tokens(category).iter().map(|t| t.value.as_str())
    }

    pub fn count(&self, category: Category) -> usize {
        self.tokens(category).len()
    }

    pub fn total_count(&self) -> usize {
        self.amount_paid.len() + self.registry_fee.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Pages where both a table row and a text path contributed tokens to
    /// `category`. Such pages may count the same line item twice.
    pub fn overlapping_pages(&self, category: Category) -> Vec<u32> {
        let mut from_tables = BTreeSet::new();
        let mut from_text = BTreeSet::new();

        for token in self.tokens(category) {
            if token.provenance.source.is_table() {
                from_tables.insert(token.provenance.page);
            } else {
                from_text.insert(token.provenance.page);
            }
        }

        from_tables.intersection(&from_text).copied().collect()
    }
}

/// Verified totals per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsResult {
    /// Sum of amount-paid tokens.
    #[serde(rename = "total_valor_pago", with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    /// Sum of registry-fee tokens.
    #[serde(rename = "total_cartorio", with = "rust_decimal::serde::float")]
    pub registry_fee: Decimal,
}

impl TotalsResult {
    pub fn get(&self, category: Category) -> Decimal {
        match category {
            Category::AmountPaid => self.amount_paid,
            Category::RegistryFee => self.registry_fee,
        }
    }

    /// Replace negative totals with zero.
    pub fn validated(self) -> Self {
        Self {
            amount_paid: self.amount_paid.max(Decimal::ZERO),
            registry_fee: self.registry_fee.max(Decimal::ZERO),
        }
    }

    /// Amount paid minus registry fee.
    pub fn difference(&self) -> Decimal {
        self.amount_paid - self.registry_fee
    }
}

/// Totals with derived statistics for reporting surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Source file name, when known.
    #[serde(rename = "arquivo", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(flatten)]
    pub totals: TotalsResult,

    /// Amount paid minus registry fee.
    #[serde(rename = "diferenca", with = "rust_decimal::serde::float")]
    pub difference: Decimal,

    #[serde(rename = "quantidade_valores_pago")]
    pub amount_paid_count: usize,

    #[serde(rename = "quantidade_cartorio")]
    pub registry_fee_count: usize,

    #[serde(rename = "total_de_valores")]
    pub total_count: usize,
}

impl ReportSummary {
    pub fn new(totals: TotalsResult, extraction: &ExtractionResult) -> Self {
        Self {
            file_name: None,
            totals,
            difference: totals.difference(),
            amount_paid_count: extraction.count(Category::AmountPaid),
            registry_fee_count: extraction.count(Category::RegistryFee),
            total_count: extraction.total_count(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_totals_serialize_as_numbers() {
        let totals = TotalsResult {
            amount_paid: Decimal::from_str("10438.75").unwrap(),
            registry_fee: Decimal::from_str("7534.35").unwrap(),
        };

        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"total_valor_pago": 10438.75, "total_cartorio": 7534.35})
        );
    }

    #[test]
    fn test_validated_clamps_negative_totals() {
        let totals = TotalsResult {
            amount_paid: Decimal::new(-100, 0),
            registry_fee: Decimal::new(-50, 0),
        }
        .validated();

        assert_eq!(totals.amount_paid, Decimal::ZERO);
        assert_eq!(totals.registry_fee, Decimal::ZERO);
    }

    #[test]
    fn test_overlapping_pages() {
        let mut result = ExtractionResult::new();
        result.push(
            Category::RegistryFee,
            RawToken::new("215,44", 1, TokenSource::TableRow { table: 0, row: 2 }),
        );
        result.push(
            Category::RegistryFee,
            RawToken::new("215,44", 1, TokenSource::TextLine { line: 4 }),
        );
        result.push(
            Category::RegistryFee,
            RawToken::new("713,27", 2, TokenSource::TextLine { line: 1 }),
        );

        assert_eq!(result.overlapping_pages(Category::RegistryFee), vec![1]);
        assert!(result.overlapping_pages(Category::AmountPaid).is_empty());
        assert_eq!(result.count(Category::RegistryFee), 3);
    }

    #[test]
    fn test_summary_fields() {
        let mut extraction = ExtractionResult::new();
        extraction.push(
            Category::AmountPaid,
            RawToken::new("301,61", 1, TokenSource::TextLine { line: 0 }),
        );
        let totals = TotalsResult {
            amount_paid: Decimal::from_str("301.61").unwrap(),
            registry_fee: Decimal::from_str("215.44").unwrap(),
        };

        let summary = ReportSummary::new(totals, &extraction).with_file_name("guias.pdf");
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["arquivo"], "guias.pdf");
        assert_eq!(json["diferenca"], 86.17);
        assert_eq!(json["quantidade_valores_pago"], 1);
        assert_eq!(json["quantidade_cartorio"], 0);
        assert_eq!(json["total_de_valores"], 1);
        assert_eq!(json["total_valor_pago"], 301.61);
    }
}
