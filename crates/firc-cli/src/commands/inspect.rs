//! Inspect command - show what the extractor sees in a report.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;

use firc_core::{
    Category, ExtractionResult, PageContent, RawToken, ReportProcessor, TokenSource,
};

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input report (PDF or JSON page dump)
    #[arg(required = true)]
    input: PathBuf,

    /// Emit JSON (pages, tokens and overlapping pages)
    #[arg(long)]
    json: bool,

    /// Omit page text from the output
    #[arg(long)]
    no_text: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let processor = ReportProcessor::from_config(&config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let source = processor.open(&args.input)?;
    let mut pages = Vec::with_capacity(source.page_count() as usize);
    let mut extraction = ExtractionResult::new();

    for number in 1..=source.page_count() {
        let page = source.page(number)?;
        processor.extractor().extract_page(&page, &mut extraction);
        pages.push(page);
    }

    if args.no_text {
        for page in &mut pages {
            page.text = None;
        }
    }

    if args.json {
        let overlapping: serde_json::Map<String, serde_json::Value> = Category::ALL
            .iter()
            .map(|c| (c.key().to_string(), json!(extraction.overlapping_pages(*c))))
            .collect();

        let output = json!({
            "pages": pages,
            "tokens": extraction,
            "overlapping_pages": overlapping,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for page in &pages {
        print_page(page);
    }

    println!("{}", style("Tokens").bold());
    for category in Category::ALL {
        let tokens = extraction.tokens(category);
        println!("  {} ({})", category, tokens.len());
        for token in tokens {
            println!("    {}", describe_token(token));
        }

        let overlapping = extraction.overlapping_pages(category);
        if !overlapping.is_empty() {
            println!(
                "  {} {} found in both tables and text on pages {:?}",
                style("!").yellow(),
                category,
                overlapping
            );
        }
    }

    Ok(())
}

fn print_page(page: &PageContent) {
    println!("{}", style(format!("Page {}", page.number)).bold());

    if let Some(text) = &page.text {
        for line in text.lines() {
            println!("  | {}", line);
        }
    }

    for (index, table) in page.tables.iter().enumerate() {
        println!(
            "  Table {} ({} rows x {} cols)",
            index,
            table.num_rows(),
            table.num_cols()
        );
        for row in &table.rows {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("-")).collect();
            println!("    [{}]", cells.join(" | "));
        }
    }

    println!();
}

fn describe_token(token: &RawToken) -> String {
    let source = match token.provenance.source {
        TokenSource::TableRow { table, row } => format!("table {} row {}", table, row),
        TokenSource::TextLine { line } => format!("line {}", line),
        TokenSource::LabeledField { offset } => format!("label at byte {}", offset),
    };
    format!("{:<16} page {}, {}", token.value, token.provenance.page, source)
}
