//! Error types for the firc-core library.
//!
//! These errors only surface at the document boundary and in configuration
//! I/O. The extraction and aggregation entry points absorb them and degrade
//! to zero totals.

use thiserror::Error;

/// Main error type for the firc library.
#[derive(Error, Debug)]
pub enum FircError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Page dump (JSON) could not be decoded.
    #[error("page dump error: {0}")]
    PageDump(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the firc library.
pub type Result<T> = std::result::Result<T, FircError>;
