//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{FircError, Result};
use crate::report::rules::DEFAULT_AMOUNT_PAID_LABELS;

/// Main configuration for the firc pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FircConfig {
    /// PDF page access configuration.
    pub pdf: PdfConfig,

    /// Token extraction configuration.
    pub extraction: ExtractionConfig,

    /// Totals configuration.
    pub aggregation: AggregationConfig,
}

/// Strategy used to recover tables from a page's text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableDetection {
    /// Never report tables; only the text-line heuristics run.
    Off,
    /// Lines split on tabs or `|` characters.
    Delimited,
    /// Lines split on runs of at least `min_column_gap` spaces.
    Whitespace,
}

impl Default for TableDetection {
    fn default() -> Self {
        Self::Delimited
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// How tables are recovered from page text.
    pub table_detection: TableDetection,

    /// Minimum run of spaces separating two cells (whitespace detection).
    pub min_column_gap: usize,

    /// Minimum cells for a line to count as a table row.
    pub min_table_columns: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            table_detection: TableDetection::default(),
            min_column_gap: 2,
            min_table_columns: 2,
        }
    }
}

/// Ordinal positions of the target fields in the report layout.
///
/// The generated reports keep a stable column order, so fields are located
/// by position. A layout change is absorbed here instead of in the rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// Zero-based table column holding the registry fee.
    pub table_registry_fee_column: usize,

    /// Minimum cells a table row needs before it is considered.
    pub min_table_row_cells: usize,

    /// Position of the amount paid among the `R$` amounts of a text line.
    pub line_amount_paid_index: usize,

    /// Position of the registry fee among the `R$` amounts of a text line.
    pub line_registry_fee_index: usize,

    /// Minimum `R$` amounts a text line needs before it is considered.
    pub min_line_amounts: usize,

    /// Lines containing any of these phrases are headers, not data.
    pub skip_phrases: Vec<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            table_registry_fee_column: 7,
            min_table_row_cells: 8,
            line_amount_paid_index: 1,
            line_registry_fee_index: 3,
            min_line_amounts: 4,
            skip_phrases: vec![
                "Guias Geradas".to_string(),
                "Rateios".to_string(),
                "Guia Cartório Cidade".to_string(),
            ],
        }
    }
}

/// Token extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Positional column mapping.
    pub layout: ColumnLayout,

    /// Labels introducing an explicit amount-paid field (case-insensitive).
    pub amount_paid_labels: Vec<String>,

    /// Run the table-row heuristic.
    pub enable_table_heuristic: bool,

    /// Run the text-line heuristic.
    pub enable_line_heuristic: bool,

    /// Run the labeled-field search.
    pub enable_labeled_fields: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            amount_paid_labels: DEFAULT_AMOUNT_PAID_LABELS.iter().map(|l| l.to_string()).collect(),
            enable_table_heuristic: true,
            enable_line_heuristic: true,
            enable_labeled_fields: true,
        }
    }
}

/// Totals configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Decimal places of the reported totals.
    pub decimal_places: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { decimal_places: 2 }
    }
}

impl FircConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| FircError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject layouts the heuristics cannot honor.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.extraction.layout;

        if layout.min_table_row_cells <= layout.table_registry_fee_column {
            return Err(FircError::Config(format!(
                "min_table_row_cells ({}) must exceed table_registry_fee_column ({})",
                layout.min_table_row_cells, layout.table_registry_fee_column
            )));
        }

        let widest = layout.line_amount_paid_index.max(layout.line_registry_fee_index);
        if layout.min_line_amounts <= widest {
            return Err(FircError::Config(format!(
                "min_line_amounts ({}) must exceed the largest line index ({})",
                layout.min_line_amounts, widest
            )));
        }

        if self.aggregation.decimal_places > 28 {
            return Err(FircError::Config(format!(
                "decimal_places ({}) exceeds decimal precision",
                self.aggregation.decimal_places
            )));
        }

        Ok(())
    }
}
