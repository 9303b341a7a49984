//! Test-pattern command - try a regex against a company's documents.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::warn;

use sigex_core::corpus::list_documents;
use sigex_core::extraction::{PatternEngine, PolicyExtractor};
use sigex_core::models::CompanyExtractionConfig;
use sigex_core::pdf::PdfTextExtractor;

use super::{load_settings, progress_bar};

/// Arguments for the test-pattern command.
#[derive(Args)]
pub struct TestPatternArgs {
    /// Company id (directory name under the PDF directory)
    company: String,

    /// Regular expression, matched case-insensitively across lines
    pattern: String,

    /// Capture group to report (0 = whole match)
    #[arg(short, long, default_value = "1")]
    group: usize,

    /// Number of documents to try
    #[arg(short = 'n', long, default_value = "5")]
    documents: usize,

    /// Directory holding the company's PDFs
    #[arg(long)]
    pdf_dir: Option<PathBuf>,
}

pub async fn run(args: TestPatternArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;
    let engine = PatternEngine::new().with_size_limit(settings.extraction.regex_size_limit);
    if !engine.compile_pattern(&args.pattern, args.group).is_valid() {
        anyhow::bail!("Pattern does not compile: {}", args.pattern);
    }

    let pdf_dir = args
        .pdf_dir
        .unwrap_or_else(|| settings.paths.company_pdf_dir(&args.company));
    let mut documents = list_documents(&pdf_dir)?;
    documents.truncate(args.documents);

    let mut extractor = PolicyExtractor::with_engine(
        args.company.as_str(),
        &CompanyExtractionConfig::default(),
        PdfTextExtractor::new(),
        engine,
    );

    let pb = progress_bar(documents.len(), "documents")?;
    let mut results = Vec::with_capacity(documents.len());
    for document in &documents {
        match extractor.test_pattern(&document.path, &args.pattern, args.group) {
            Ok(matches) => results.push((document.id.as_str(), Ok(matches))),
            Err(e) => {
                warn!("Failed to read {}: {}", document.path.display(), e);
                results.push((document.id.as_str(), Err(e.to_string())));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut hits = 0;
    for (id, result) in &results {
        match result {
            Ok(matches) if matches.is_empty() => {
                println!("{} {}: no match", style("✗").red(), id);
            }
            Ok(matches) => {
                hits += 1;
                println!("{} {}: {} match(es)", style("✓").green(), id, matches.len());
                for m in matches {
                    println!("    {:?}", m);
                }
            }
            Err(e) => println!("{} {}: {}", style("⚠").yellow(), id, e),
        }
    }

    println!();
    println!("Matched {}/{} documents", hits, results.len());
    Ok(())
}
