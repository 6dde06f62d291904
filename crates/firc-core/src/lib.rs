//! Core library for payment-guide report reconciliation.
//!
//! This crate provides:
//! - Page access over PDFs and JSON page dumps (text and tables)
//! - Positional heuristics locating "valor pago" and "tarifa cartório" amounts
//! - Locale-aware normalization of Brazilian and international amount formats
//! - Exact decimal aggregation into verified, non-negative totals

pub mod error;
pub mod models;
pub mod pdf;
pub mod report;

pub use error::{FircError, PdfError, Result};
pub use models::config::{ColumnLayout, FircConfig};
pub use models::report::{
    Category, ExtractionResult, Provenance, RawToken, ReportSummary, TokenSource, TotalsResult,
};
pub use pdf::{MemoryDocument, PageContent, PageSource, PdfDocument, Table};
pub use report::rules::{format_brl, is_valid_decimal, normalize, RawValue};
pub use report::{
    aggregate, process, process_file, Aggregator, DocumentExtractor, ReportAnalysis,
    ReportProcessor,
};
