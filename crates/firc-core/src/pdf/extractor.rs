//! PDF page access using lopdf and pdf-extract.

use std::panic;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::table::{detect_tables, TableOptions};
use super::{PageContent, PageSource};
use crate::error::{PdfError, Result};
use crate::models::config::PdfConfig;

/// An opened PDF. The file is read once; dropping the value releases it.
pub struct PdfDocument {
    document: Document,
    /// Per-page text rendered by pdf-extract, when it succeeded.
    rendered: Option<Vec<String>>,
    table_options: TableOptions,
    max_pages: usize,
}

impl PdfDocument {
    /// Open a PDF from disk.
    pub fn open(path: &Path, config: &PdfConfig) -> Result<Self> {
        let data = std::fs::read(path)?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Self::load(&data, config)
    }

    /// Load a PDF from bytes.
    pub fn load(data: &[u8], config: &PdfConfig) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted.into());
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages.into());
        }

        let rendered = render_pages(&raw_data, page_count);
        debug!(
            "Loaded PDF with {} pages (pdf-extract text: {})",
            page_count,
            rendered.is_some()
        );

        Ok(Self {
            document,
            rendered,
            table_options: TableOptions {
                strategy: config.table_detection,
                min_gap: config.min_column_gap,
                min_columns: config.min_table_columns,
            },
            max_pages: config.max_pages,
        })
    }

    /// Plain text of a page, preferring the pdf-extract rendering.
    fn page_text(&self, number: u32) -> Result<String> {
        if let Some(text) = self
            .rendered
            .as_ref()
            .and_then(|pages| pages.get(number as usize - 1))
        {
            return Ok(text.clone());
        }

        trace!("Falling back to lopdf text for page {}", number);
        self.document
            .extract_text(&[number])
            .map_err(|e| PdfError::TextExtraction(e.to_string()).into())
    }
}

/// Render every page with pdf-extract. Returns `None` when it fails, panics,
/// or disagrees with lopdf about the page count.
fn render_pages(data: &[u8], page_count: usize) -> Option<Vec<String>> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
        Ok(Ok(pages)) if pages.len() == page_count => Some(pages),
        Ok(Ok(pages)) => {
            warn!(
                "pdf-extract returned {} pages, expected {}",
                pages.len(),
                page_count
            );
            None
        }
        Ok(Err(e)) => {
            warn!("pdf-extract failed: {}", e);
            None
        }
        Err(_) => {
            warn!("pdf-extract panicked, using lopdf text");
            None
        }
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        let total = self.document.get_pages().len();
        let limited = if self.max_pages > 0 {
            total.min(self.max_pages)
        } else {
            total
        };
        limited as u32
    }

    fn page(&self, number: u32) -> Result<PageContent> {
        if number == 0 || number > self.page_count() {
            return Err(PdfError::InvalidPage(number).into());
        }

        let text = self.page_text(number)?;
        let tables = detect_tables(&text, self.table_options);
        trace!(
            "Page {}: {} chars, {} tables",
            number,
            text.len(),
            tables.len()
        );

        Ok(PageContent {
            number,
            tables,
            text: (!text.trim().is_empty()).then_some(text),
        })
    }
}
