//! Page-oriented document access.
//!
//! The extractor only sees [`PageSource`]: per page, zero or more tables of
//! text cells and an optional plain-text rendering. [`PdfDocument`] backs it
//! with a real PDF, [`MemoryDocument`] with pages held in memory or decoded
//! from a JSON page dump.

mod extractor;
pub mod table;

pub use extractor::PdfDocument;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PdfError, Result};

/// A table as a sequence of rows; cells may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a table where every cell is present.
    pub fn from_cells<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the table.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Content from a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed).
    pub number: u32,
    /// Tables found on the page.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Plain-text rendering of the page.
    #[serde(default)]
    pub text: Option<String>,
}

/// Trait for document backends that expose pages.
pub trait PageSource {
    /// Get the number of pages in the document.
    fn page_count(&self) -> u32;

    /// Get the content of a page (1-indexed).
    fn page(&self, number: u32) -> Result<PageContent>;
}

/// Document whose pages are already materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<PageContent>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }

    /// Decode a JSON page dump (`{"pages": [{"number": 1, "tables": [...], "text": "..."}]}`).
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Read a JSON page dump from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

impl PageSource for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<PageContent> {
        let index = number.checked_sub(1).ok_or(PdfError::InvalidPage(number))?;
        let mut page = self
            .pages
            .get(index as usize)
            .cloned()
            .ok_or(PdfError::InvalidPage(number))?;
        page.number = number;
        Ok(page)
    }
}
