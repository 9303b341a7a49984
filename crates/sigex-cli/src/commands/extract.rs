//! Extract command - run a company's extraction config over its PDFs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use sigex_core::corpus::list_documents;
use sigex_core::extraction::{CorpusExtraction, ExtractionSummary, PolicyExtractor};
use sigex_core::models::config::SigexSettings;
use sigex_core::pdf::PdfTextExtractor;

use super::{load_settings, spinner, styled_status};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Company id (directory name under the PDF directory)
    company: String,

    /// Output path for the raw artifact
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding the company's PDFs
    #[arg(long)]
    pdf_dir: Option<PathBuf>,

    /// Only process the first N documents
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Also write per-field statistics as CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Record unreadable documents instead of aborting
    #[arg(long)]
    continue_on_error: bool,
}

/// Options shared by `extract` and `run`.
pub struct ExtractOptions {
    pub pdf_dir: Option<PathBuf>,
    pub limit: Option<usize>,
    pub continue_on_error: bool,
    pub interrupt: Option<Arc<AtomicBool>>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let settings = load_settings(config_path)?;

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let options = ExtractOptions {
        pdf_dir: args.pdf_dir,
        limit: args.limit,
        continue_on_error: args.continue_on_error || settings.extraction.continue_on_error,
        interrupt: Some(interrupt),
    };
    let extraction = extract_company(&args.company, &settings, &options)?;

    let output = args
        .output
        .unwrap_or_else(|| settings.paths.raw_artifact(&args.company));
    extraction.save_artifact(&output)?;

    let summary = extraction.summary(settings.extraction.success_threshold);
    print_summary(&args.company, &extraction, &summary);

    if let Some(path) = args.summary {
        write_summary_csv(&path, &summary)?;
        println!("{} Summary written to {}", style("✓").green(), path.display());
    }

    println!(
        "{} Saved {} in {:?}",
        style("✓").green(),
        output.display(),
        start.elapsed()
    );
    Ok(())
}

/// Extract every configured field of `company` from its PDF directory.
pub fn extract_company(
    company: &str,
    settings: &SigexSettings,
    options: &ExtractOptions,
) -> anyhow::Result<CorpusExtraction> {
    let pdf_dir = options
        .pdf_dir
        .clone()
        .unwrap_or_else(|| settings.paths.company_pdf_dir(company));
    let mut documents = list_documents(&pdf_dir)?;
    if let Some(limit) = options.limit {
        documents.truncate(limit);
    }
    debug!("Found {} documents in {}", documents.len(), pdf_dir.display());

    let mut extractor = PolicyExtractor::from_settings(company, settings, PdfTextExtractor::new())?
        .with_continue_on_error(options.continue_on_error);
    if let Some(flag) = &options.interrupt {
        extractor = extractor.with_interrupt(flag.clone());
    }

    let pb = spinner(format!("Extracting {} ({} documents)", company, documents.len()))?;
    let extraction = extractor.extract_corpus(&documents);
    pb.finish_and_clear();
    Ok(extraction?)
}

fn print_summary(company: &str, extraction: &CorpusExtraction, summary: &ExtractionSummary) {
    println!();
    println!(
        "{} {}: {} documents, {} fields",
        style("ℹ").blue(),
        style(company).bold(),
        extraction.documents,
        summary.fields.len()
    );

    for (name, stats) in summary.ranked() {
        println!("  {} {}: {}", styled_status(stats.status(summary.threshold)), name, stats);
    }

    println!(
        "  Working fields: {}/{} ({:.1}%)",
        summary.working_fields(),
        summary.fields.len(),
        summary.completion_rate()
    );

    if !extraction.failed.is_empty() {
        println!();
        println!("{}", style("Failed documents:").red());
        for failure in &extraction.failed {
            println!("  - {}: {}", failure.document_id, failure.error);
        }
    }

    if extraction.interrupted {
        println!(
            "{} Interrupted, artifact holds the {} documents processed so far",
            style("⚠").yellow(),
            extraction.documents
        );
    }
}

fn write_summary_csv(path: &Path, summary: &ExtractionSummary) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["field", "successful", "total", "success_rate", "status"])?;
    for (name, stats) in summary.ranked() {
        wtr.write_record([
            name,
            &stats.successful.to_string(),
            &stats.total.to_string(),
            &format!("{:.1}", stats.success_rate),
            &stats.status(summary.threshold).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
