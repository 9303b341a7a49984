//! Run command - extract then map one or more companies.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{error, info};

use sigex_core::models::config::SigexSettings;

use super::extract::{extract_company, ExtractOptions};
use super::load_settings;
use super::map::map_company;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Company to process (repeatable)
    #[arg(short = 'C', long = "company", required_unless_present = "all")]
    companies: Vec<String>,

    /// Process every company directory under the PDF directory
    #[arg(long, conflicts_with = "companies")]
    all: bool,

    /// Reuse existing raw artifacts instead of extracting
    #[arg(long)]
    skip_extraction: bool,

    /// Record unreadable documents instead of failing the company
    #[arg(long)]
    continue_on_error: bool,
}

/// What happened to one company.
enum Outcome {
    Done { documents: Option<usize>, mapped: bool },
    Failed(String),
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let settings = load_settings(config_path)?;

    let companies = if args.all {
        settings.paths.list_companies()?
    } else {
        args.companies.clone()
    };
    if companies.is_empty() {
        anyhow::bail!("No companies found in {}", settings.paths.pdf_dir.display());
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    println!(
        "{} Processing {} companies",
        style("ℹ").blue(),
        companies.len()
    );

    let mut outcomes = Vec::with_capacity(companies.len());
    for company in &companies {
        if interrupt.load(Ordering::SeqCst) {
            break;
        }
        println!("{} {}", style("→").cyan(), style(company).bold());

        let outcome = match process_company(company, &settings, &args) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to process {}: {:#}", company, e);
                Outcome::Failed(format!("{:#}", e))
            }
        };
        outcomes.push((company.as_str(), outcome));
    }

    println!();
    let mut failed = 0;
    for (company, outcome) in &outcomes {
        match outcome {
            Outcome::Done { documents, mapped } => {
                let extracted = documents
                    .map(|n| format!("{} documents", n))
                    .unwrap_or_else(|| "extraction skipped".to_string());
                let mapping = if *mapped { "mapped" } else { "no mapping config" };
                println!("  {} {}: {}, {}", style("✓").green(), company, extracted, mapping);
            }
            Outcome::Failed(e) => {
                failed += 1;
                println!("  {} {}: {}", style("✗").red(), company, e);
            }
        }
    }

    if outcomes.len() < companies.len() {
        println!(
            "{} Interrupted after {}/{} companies",
            style("⚠").yellow(),
            outcomes.len(),
            companies.len()
        );
    }

    println!(
        "{} Processed {} companies in {:?} ({} failed)",
        style("✓").green(),
        outcomes.len(),
        start.elapsed(),
        failed
    );

    Ok(())
}

fn process_company(company: &str, settings: &SigexSettings, args: &RunArgs) -> anyhow::Result<Outcome> {
    let documents = if args.skip_extraction {
        let raw = settings.paths.raw_artifact(company);
        if !raw.exists() {
            anyhow::bail!("No raw artifact at {}", raw.display());
        }
        info!("Reusing {}", raw.display());
        None
    } else {
        let options = ExtractOptions {
            pdf_dir: None,
            limit: None,
            continue_on_error: args.continue_on_error || settings.extraction.continue_on_error,
            interrupt: None,
        };
        let extraction = extract_company(company, settings, &options)?;
        extraction.save_artifact(&settings.paths.raw_artifact(company))?;
        Some(extraction.documents)
    };

    let mapped = map_company(company, settings)?.is_some();
    Ok(Outcome::Done { documents, mapped })
}
