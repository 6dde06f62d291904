//! Payment-guide report processing: token extraction and totals.

mod aggregator;
mod extractor;
pub mod rules;

pub use aggregator::Aggregator;
pub use extractor::DocumentExtractor;

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::config::{FircConfig, PdfConfig};
use crate::models::report::{ExtractionResult, ReportSummary, TotalsResult};
use crate::pdf::{MemoryDocument, PageSource, PdfDocument};

/// Outcome of a full pass over one document.
#[derive(Debug, Clone)]
pub struct ReportAnalysis {
    /// Raw tokens with provenance.
    pub extraction: ExtractionResult,
    /// Verified totals.
    pub totals: TotalsResult,
    /// Source file name, when processed from disk.
    pub file_name: Option<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ReportAnalysis {
    /// Totals with derived statistics.
    pub fn summary(&self) -> ReportSummary {
        let summary = ReportSummary::new(self.totals, &self.extraction);
        match &self.file_name {
            Some(name) => summary.with_file_name(name.clone()),
            None => summary,
        }
    }
}

/// Extraction followed by aggregation, configured once and reusable.
pub struct ReportProcessor {
    extractor: DocumentExtractor,
    aggregator: Aggregator,
    pdf: PdfConfig,
}

impl ReportProcessor {
    /// Create a processor with default settings.
    pub fn new() -> Self {
        Self::from_config(&FircConfig::default())
    }

    pub fn from_config(config: &FircConfig) -> Self {
        Self {
            extractor: DocumentExtractor::from_config(&config.extraction),
            aggregator: Aggregator::from_config(&config.aggregation),
            pdf: config.pdf.clone(),
        }
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    /// Totals for a document. Never fails.
    pub fn process<S: PageSource + ?Sized>(&self, source: &S) -> TotalsResult {
        self.analyze(source).totals
    }

    /// Totals for a file on disk. Missing or unreadable files yield zero totals.
    pub fn process_file(&self, path: &Path) -> TotalsResult {
        self.analyze_file(path).totals
    }

    /// Extraction and totals for a document.
    pub fn analyze<S: PageSource + ?Sized>(&self, source: &S) -> ReportAnalysis {
        let start = Instant::now();
        let extraction = self.extractor.extract(source);
        let totals = self.aggregator.aggregate(&extraction);

        ReportAnalysis {
            extraction,
            totals,
            file_name: None,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Extraction and totals for a file on disk.
    ///
    /// Unreadable files degrade to an empty extraction with zero totals.
    pub fn analyze_file(&self, path: &Path) -> ReportAnalysis {
        let start = Instant::now();

        self.try_analyze_file(path).unwrap_or_else(|e| {
            warn!("Could not read {}: {}", path.display(), e);
            let extraction = ExtractionResult::default();
            ReportAnalysis {
                totals: self.aggregator.aggregate(&extraction),
                extraction,
                file_name: file_name(path),
                processing_time_ms: start.elapsed().as_millis() as u64,
            }
        })
    }

    /// Extraction and totals for a file on disk, surfacing read errors.
    pub fn try_analyze_file(&self, path: &Path) -> Result<ReportAnalysis> {
        let start = Instant::now();
        info!("Processing report: {}", path.display());

        let source = self.open(path)?;
        let extraction = self.extractor.try_extract(source.as_ref())?;
        let totals = self.aggregator.aggregate(&extraction);

        info!(
            "Processed {}: valor pago {}, cartório {}",
            path.display(),
            totals.amount_paid,
            totals.registry_fee
        );

        Ok(ReportAnalysis {
            extraction,
            totals,
            file_name: file_name(path),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Open a document by extension: `.json` page dumps, anything else as PDF.
    pub fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(Box::new(MemoryDocument::from_file(path)?)),
            _ => Ok(Box::new(PdfDocument::open(path, &self.pdf)?)),
        }
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

impl Default for ReportProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract and total a document with default settings.
pub fn process<S: PageSource + ?Sized>(source: &S) -> TotalsResult {
    ReportProcessor::new().process(source)
}

/// Extract and total a file with default settings.
pub fn process_file(path: &Path) -> TotalsResult {
    ReportProcessor::new().process_file(path)
}

/// Totals for an extraction with default settings.
pub fn aggregate(extraction: &ExtractionResult) -> TotalsResult {
    Aggregator::new().aggregate(extraction)
}
