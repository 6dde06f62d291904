//! Process command - total a single report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use firc_core::{format_brl, ReportAnalysis, ReportProcessor, ReportSummary};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input report (PDF or JSON page dump)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include difference and token counts
    #[arg(long)]
    detailed: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let processor = ReportProcessor::from_config(&config);

    // A missing report totals zero rather than failing
    if !args.input.exists() {
        warn!("Input file not found: {}", args.input.display());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Processing {}...", args.input.display()));

    let analysis = processor.analyze_file(&args.input);

    pb.finish_and_clear();

    let output = format_analysis(&analysis, args.format, args.detailed)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render an analysis in the requested format.
pub fn format_analysis(
    analysis: &ReportAnalysis,
    format: OutputFormat,
    detailed: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if detailed => Ok(serde_json::to_string(&analysis.summary())?),
        OutputFormat::Json => Ok(serde_json::to_string(&analysis.totals)?),
        OutputFormat::Csv => format_csv(&analysis.summary()),
        OutputFormat::Text => Ok(format_text(&analysis.summary(), detailed)),
    }
}

fn format_csv(summary: &ReportSummary) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "arquivo",
        "total_valor_pago",
        "total_cartorio",
        "diferenca",
        "quantidade_valores_pago",
        "quantidade_cartorio",
        "total_de_valores",
    ])?;

    wtr.write_record([
        summary.file_name.as_deref().unwrap_or(""),
        &summary.totals.amount_paid.to_string(),
        &summary.totals.registry_fee.to_string(),
        &summary.difference.to_string(),
        &summary.amount_paid_count.to_string(),
        &summary.registry_fee_count.to_string(),
        &summary.total_count.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(summary: &ReportSummary, detailed: bool) -> String {
    let mut output = String::new();

    if let Some(name) = &summary.file_name {
        output.push_str(&format!("Arquivo: {}\n\n", name));
    }

    output.push_str(&format!("Total Valor Pago: {}\n", format_brl(summary.totals.amount_paid)));
    output.push_str(&format!("Total Cartório:   {}\n", format_brl(summary.totals.registry_fee)));

    if detailed {
        output.push('\n');
        output.push_str(&format!("Diferença:        {}\n", format_brl(summary.difference)));
        output.push_str(&format!("Valores pagos:    {}\n", summary.amount_paid_count));
        output.push_str(&format!("Valores cartório: {}\n", summary.registry_fee_count));
        output.push_str(&format!("Total de valores: {}\n", summary.total_count));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use firc_core::{Category, ExtractionResult, RawToken, TokenSource};

    fn analysis() -> ReportAnalysis {
        let mut extraction = ExtractionResult::new();
        extraction.push(
            Category::AmountPaid,
            RawToken::new("1.234,56", 1, TokenSource::TextLine { line: 0 }),
        );
        extraction.push(
            Category::RegistryFee,
            RawToken::new("234,56", 1, TokenSource::TextLine { line: 0 }),
        );
        let totals = firc_core::aggregate(&extraction);
        ReportAnalysis {
            extraction,
            totals,
            file_name: Some("guias.pdf".to_string()),
            processing_time_ms: 0,
        }
    }

    #[test]
    fn test_json_totals_only() {
        let output = format_analysis(&analysis(), OutputFormat::Json, false).unwrap();
        assert_eq!(output, r#"{"total_valor_pago":1234.56,"total_cartorio":234.56}"#);
    }

    #[test]
    fn test_json_detailed() {
        let output = format_analysis(&analysis(), OutputFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["arquivo"], "guias.pdf");
        assert_eq!(value["diferenca"], 1000.0);
        assert_eq!(value["total_de_valores"], 2);
    }

    #[test]
    fn test_csv_and_text() {
        let csv = format_analysis(&analysis(), OutputFormat::Csv, false).unwrap();
        assert!(csv.starts_with("arquivo,total_valor_pago,total_cartorio"));
        assert!(csv.contains("guias.pdf,1234.56,234.56,1000.00,1,1,2"));

        let text = format_analysis(&analysis(), OutputFormat::Text, false).unwrap();
        assert!(text.contains("Total Valor Pago: R$ 1.234,56"));
        assert!(!text.contains("Diferença"));
    }
}
