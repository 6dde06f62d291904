//! Positional and pattern heuristics over report pages.

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::models::config::{ColumnLayout, ExtractionConfig};
use crate::models::report::{Category, ExtractionResult, RawToken, TokenSource};
use crate::pdf::{PageContent, PageSource, Table};

use super::rules::{
    is_monetary_shape, CurrencyAmountExtractor, FieldExtractor, LabeledAmountExtractor,
};

/// Collects raw amount-paid and registry-fee tokens from a document.
///
/// Every page goes through all enabled heuristics and the results are
/// unioned without deduplication:
/// - table rows: the registry fee sits in a fixed column
/// - text lines: amount paid and registry fee sit at fixed positions among
///   the line's `R$` amounts
/// - labeled fields: "Valor Pago: ..." anywhere on the page
///
/// The extractor holds configuration only; each call builds a fresh result.
pub struct DocumentExtractor {
    layout: ColumnLayout,
    currency: CurrencyAmountExtractor,
    labeled: LabeledAmountExtractor,
    table_heuristic: bool,
    line_heuristic: bool,
    labeled_fields: bool,
}

impl DocumentExtractor {
    /// Create an extractor with the default report layout.
    pub fn new() -> Self {
        Self {
            layout: ColumnLayout::default(),
            currency: CurrencyAmountExtractor::new(),
            labeled: LabeledAmountExtractor::new(),
            table_heuristic: true,
            line_heuristic: true,
            labeled_fields: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let labeled = LabeledAmountExtractor::with_labels(&config.amount_paid_labels)
            .unwrap_or_else(|e| {
                warn!("Invalid amount-paid labels, using default: {}", e);
                LabeledAmountExtractor::new()
            });

        Self {
            layout: config.layout.clone(),
            currency: CurrencyAmountExtractor::new(),
            labeled,
            table_heuristic: config.enable_table_heuristic,
            line_heuristic: config.enable_line_heuristic,
            labeled_fields: config.enable_labeled_fields,
        }
    }

    /// Set the column layout.
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable the table-row heuristic.
    pub fn with_table_heuristic(mut self, enabled: bool) -> Self {
        self.table_heuristic = enabled;
        self
    }

    /// Enable or disable the text-line heuristic.
    pub fn with_line_heuristic(mut self, enabled: bool) -> Self {
        self.line_heuristic = enabled;
        self
    }

    /// Enable or disable the labeled-field search.
    pub fn with_labeled_fields(mut self, enabled: bool) -> Self {
        self.labeled_fields = enabled;
        self
    }

    /// Extract tokens from every page.
    ///
    /// Never fails: if the document cannot be read, both sequences come back
    /// empty. Callers that must tell "no data" from "unreadable" use
    /// [`try_extract`](Self::try_extract).
    pub fn extract<S: PageSource + ?Sized>(&self, source: &S) -> ExtractionResult {
        match self.try_extract(source) {
            Ok(result) => result,
            Err(e) => {
                warn!("Extraction failed, reporting no tokens: {}", e);
                ExtractionResult::default()
            }
        }
    }

    /// Extract tokens, surfacing the first page error.
    pub fn try_extract<S: PageSource + ?Sized>(&self, source: &S) -> Result<ExtractionResult> {
        let mut result = ExtractionResult::new();
        let page_count = source.page_count();

        for number in 1..=page_count {
            let page = source.page(number)?;
            self.extract_page(&page, &mut result);
        }

        debug!(
            "Extracted {} amount-paid and {} registry-fee tokens from {} pages",
            result.count(Category::AmountPaid),
            result.count(Category::RegistryFee),
            page_count
        );

        Ok(result)
    }

    /// Run all enabled heuristics over one page, appending to `result`.
    pub fn extract_page(&self, page: &PageContent, result: &mut ExtractionResult) {
        if self.table_heuristic {
            for (index, table) in page.tables.iter().enumerate() {
                self.extract_from_table(page.number, index, table, result);
            }
        }

        let Some(text) = page.text.as_deref() else {
            return;
        };

        if self.line_heuristic {
            self.extract_from_lines(page.number, text, result);
        }

        if self.labeled_fields {
            self.extract_labeled(page.number, text, result);
        }
    }

    fn extract_from_table(
        &self,
        page: u32,
        table_index: usize,
        table: &Table,
        result: &mut ExtractionResult,
    ) {
        let column = self.layout.table_registry_fee_column;

        for (row_index, row) in table.rows.iter().enumerate() {
            if row.len() < self.layout.min_table_row_cells {
                continue;
            }

            let Some(cell) = row.get(column).and_then(|c| c.as_deref()) else {
                continue;
            };

            if is_monetary_shape(cell) {
                trace!("Page {} table {} row {}: registry fee {}", page, table_index, row_index, cell);
                result.push(
                    Category::RegistryFee,
                    RawToken::new(
                        cell,
                        page,
                        TokenSource::TableRow {
                            table: table_index,
                            row: row_index,
                        },
                    ),
                );
            }
        }
    }

    fn extract_from_lines(&self, page: u32, text: &str, result: &mut ExtractionResult) {
        for (line_index, line) in text.lines().enumerate() {
            if self.is_header_line(line) {
                continue;
            }

            let amounts = self.currency.extract_all(line);
            if amounts.len() < self.layout.min_line_amounts {
                continue;
            }

            let positions = [
                (Category::AmountPaid, self.layout.line_amount_paid_index),
                (Category::RegistryFee, self.layout.line_registry_fee_index),
            ];

            for (category, position) in positions {
                if let Some(amount) = amounts.get(position) {
                    if is_monetary_shape(&amount.value) {
                        result.push(
                            category,
                            RawToken::new(
                                amount.value.clone(),
                                page,
                                TokenSource::TextLine { line: line_index },
                            ),
                        );
                    }
                }
            }
        }
    }

    fn extract_labeled(&self, page: u32, text: &str, result: &mut ExtractionResult) {
        for field in self.labeled.extract_all(text) {
            if is_monetary_shape(&field.value) {
                result.push(
                    Category::AmountPaid,
                    RawToken::new(field.value, page, TokenSource::LabeledField { offset: field.start }),
                );
            }
        }
    }

    fn is_header_line(&self, line: &str) -> bool {
        self.layout
            .skip_phrases
            .iter()
            .any(|phrase| !phrase.is_empty() && line.contains(phrase.as_str()))
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FircError, PdfError};
    use crate::pdf::MemoryDocument;
    use pretty_assertions::assert_eq;

    const DATA_LINE: &str =
        "0024102419 Serventia Geral R$ 301,61 R$ 301,61 R$ 0,00 R$ 215,44 R$ 86,17";

    fn text_page(number: u32, text: &str) -> PageContent {
        PageContent {
            number,
            tables: Vec::new(),
            text: Some(text.to_string()),
        }
    }

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    fn values(result: &ExtractionResult, category: Category) -> Vec<&str> {
        result.values(category).collect()
    }

    #[test]
    fn test_text_line_positions() {
        let doc = MemoryDocument::new(vec![text_page(1, DATA_LINE)]);
        let result = DocumentExtractor::new().extract(&doc);

        assert_eq!(values(&result, Category::AmountPaid), vec!["301,61"]);
        assert_eq!(values(&result, Category::RegistryFee), vec!["215,44"]);
        assert_eq!(
            result.registry_fee[0].provenance.source,
            TokenSource::TextLine { line: 0 }
        );
    }

    #[test]
    fn test_short_lines_and_headers_are_skipped() {
        let text = "Guias Geradas R$ 1,00 R$ 2,00 R$ 3,00 R$ 4,00\n\
                    Rateios R$ 1,00 R$ 2,00 R$ 3,00 R$ 4,00\n\
                    Guia Cartório Cidade R$ 1,00 R$ 2,00 R$ 3,00 R$ 4,00\n\
                    Subtotal R$ 10,00 R$ 20,00 R$ 30,00";
        let doc = MemoryDocument::new(vec![text_page(1, text)]);
        let result = DocumentExtractor::new().extract(&doc);

        assert!(result.is_empty());
    }

    #[test]
    fn test_table_registry_fee_column() {
        let table = Table::new(vec![
            row(&["Guia", "Cartório", "Cidade", "Data", "Valor", "Pago", "Tarifa", "Cartório"]),
            row(&["1", "2", "3", "4", "5", "6", "7", "R$ 215,44", "extra"]),
            row(&["1", "2", "3", "4", "5", "6", "7"]),
            row(&["1", "2", "3", "4", "5", "6", "7", "6.605,64"]),
            vec![None; 8],
        ]);
        let doc = MemoryDocument::new(vec![PageContent {
            number: 1,
            tables: vec![table],
            text: None,
        }]);

        let result = DocumentExtractor::new().extract(&doc);

        assert_eq!(values(&result, Category::RegistryFee), vec!["R$ 215,44", "6.605,64"]);
        assert!(result.amount_paid.is_empty());
        assert_eq!(
            result.registry_fee[1].provenance.source,
            TokenSource::TableRow { table: 0, row: 3 }
        );
    }

    #[test]
    fn test_eight_cell_row_with_text_contributes_nothing() {
        let table = Table::new(vec![row(&["a", "b", "c", "d", "e", "f", "g", "Cartório"])]);
        let doc = MemoryDocument::new(vec![PageContent {
            number: 1,
            tables: vec![table],
            text: None,
        }]);

        assert!(DocumentExtractor::new().extract(&doc).is_empty());
    }

    #[test]
    fn test_labeled_field_adds_to_amount_paid() {
        let text = format!("{}\nValor Pago: R$ 985,92", DATA_LINE);
        let doc = MemoryDocument::new(vec![text_page(1, &text)]);
        let result = DocumentExtractor::new().extract(&doc);

        assert_eq!(values(&result, Category::AmountPaid), vec!["301,61", "R$ 985,92"]);
        assert!(matches!(
            result.amount_paid[1].provenance.source,
            TokenSource::LabeledField { .. }
        ));
    }

    #[test]
    fn test_heuristics_union_across_pages_without_dedup() {
        let table = Table::new(vec![row(&["1", "2", "3", "4", "5", "6", "7", "215,44"])]);
        let doc = MemoryDocument::new(vec![
            PageContent {
                number: 1,
                tables: vec![table],
                text: Some(DATA_LINE.to_string()),
            },
            text_page(2, DATA_LINE),
        ]);

        let result = DocumentExtractor::new().extract(&doc);

        assert_eq!(
            values(&result, Category::RegistryFee),
            vec!["215,44", "215,44", "215,44"]
        );
        assert_eq!(result.overlapping_pages(Category::RegistryFee), vec![1]);
        assert_eq!(result.registry_fee[2].provenance.page, 2);
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let doc = MemoryDocument::new(vec![PageContent::default(), text_page(2, "sem dados")]);
        let result = DocumentExtractor::new().extract(&doc);
        assert_eq!(result, ExtractionResult::default());
    }

    #[test]
    fn test_header_ending_in_label_does_not_read_next_line() {
        let text = format!("Guia Cartório Cidade Valor Guia Valor Pago\n{}", DATA_LINE);
        let doc = MemoryDocument::new(vec![text_page(1, &text)]);
        let result = DocumentExtractor::new().extract(&doc);

        assert_eq!(values(&result, Category::AmountPaid), vec!["301,61"]);
        assert_eq!(values(&result, Category::RegistryFee), vec!["215,44"]);
    }

    #[test]
    fn test_english_label_from_config() {
        let doc = MemoryDocument::new(vec![text_page(1, "Amount Paid: 1,234.56")]);
        let result = DocumentExtractor::from_config(&ExtractionConfig::default()).extract(&doc);

        assert_eq!(values(&result, Category::AmountPaid), vec!["1,234.56"]);
    }

    struct BrokenDocument;

    impl PageSource for BrokenDocument {
        fn page_count(&self) -> u32 {
            2
        }

        fn page(&self, number: u32) -> Result<PageContent> {
            if number == 1 {
                Ok(text_page(1, DATA_LINE))
            } else {
                Err(PdfError::TextExtraction("corrupt stream".to_string()).into())
            }
        }
    }

    #[test]
    fn test_read_failure_degrades_to_empty() {
        let extractor = DocumentExtractor::new();

        assert!(extractor.extract(&BrokenDocument).is_empty());
        assert!(matches!(
            extractor.try_extract(&BrokenDocument),
            Err(FircError::Pdf(PdfError::TextExtraction(_)))
        ));
    }

    #[test]
    fn test_custom_layout() {
        let layout = ColumnLayout {
            table_registry_fee_column: 2,
            min_table_row_cells: 3,
            line_amount_paid_index: 0,
            line_registry_fee_index: 1,
            min_line_amounts: 2,
            skip_phrases: Vec::new(),
        };
        let doc = MemoryDocument::new(vec![PageContent {
            number: 1,
            tables: vec![Table::new(vec![row(&["x", "y", "1,50"])])],
            text: Some("Guias Geradas R$ 5,00 R$ 2,00".to_string()),
        }]);

        let result = DocumentExtractor::new()
            .with_layout(layout)
            .with_labeled_fields(false)
            .extract(&doc);

        assert_eq!(values(&result, Category::AmountPaid), vec!["5,00"]);
        assert_eq!(values(&result, Category::RegistryFee), vec!["1,50", "2,00"]);
    }

    #[test]
    fn test_disabled_heuristics() {
        let table = Table::new(vec![row(&["1", "2", "3", "4", "5", "6", "7", "215,44"])]);
        let doc = MemoryDocument::new(vec![PageContent {
            number: 1,
            tables: vec![table],
            text: Some(DATA_LINE.to_string()),
        }]);

        let result = DocumentExtractor::new()
            .with_table_heuristic(false)
            .with_line_heuristic(false)
            .extract(&doc);

        assert!(result.is_empty());
    }
}
