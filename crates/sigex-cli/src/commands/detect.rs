//! Detect command - guess the insurer of PDF files.

use std::path::PathBuf;

use clap::Args;
use console::style;
use glob::glob;
use tracing::warn;

use sigex_core::company::{company_from_dir_name, CompanyDetector};
use sigex_core::pdf::PdfTextExtractor;

use super::progress_bar;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// PDF files or directories (searched recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Compare against the company implied by each file's directory (`ak_E` -> `ak`)
    #[arg(long)]
    evaluate: bool,
}

struct Detection {
    path: PathBuf,
    detected: Option<String>,
    expected: Option<String>,
}

pub async fn run(args: DetectArgs) -> anyhow::Result<()> {
    let files = expand_paths(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found");
    }

    let detector = CompanyDetector::new();
    let source = PdfTextExtractor::new();
    let pb = progress_bar(files.len(), "files")?;

    let mut detections = Vec::with_capacity(files.len());
    for path in files {
        let detected = match detector.detect_document(&source, &path) {
            Ok(detected) => detected.map(str::to_string),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        };
        let expected = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|n| company_from_dir_name(n).to_string());
        detections.push(Detection { path, detected, expected });
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !args.evaluate {
        for d in &detections {
            println!("{}: {}", d.path.display(), d.detected.as_deref().unwrap_or("-"));
        }
        return Ok(());
    }

    let mut correct = 0;
    let mut mismatches = Vec::new();
    for d in &detections {
        if d.detected.is_some() && d.detected == d.expected {
            correct += 1;
            println!("{} {}", style("✓").green(), d.path.display());
        } else {
            println!(
                "{} {}: {} -> {}",
                style("✗").red(),
                d.path.display(),
                d.expected.as_deref().unwrap_or("-"),
                d.detected.as_deref().unwrap_or("-")
            );
            mismatches.push(d);
        }
    }

    let total = detections.len();
    println!();
    println!("Total PDFs: {}", total);
    println!("Correct: {}", style(correct).green());
    println!("Accuracy: {:.1}%", correct as f64 / total as f64 * 100.0);

    if !mismatches.is_empty() {
        println!();
        println!("{}", style(format!("Mismatches ({})", mismatches.len())).red());
        for d in mismatches.iter().take(10) {
            println!(
                "  {}: expected '{}', got '{}'",
                d.path.display(),
                d.expected.as_deref().unwrap_or("-"),
                d.detected.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

/// Files as given, directories expanded to every PDF below them.
fn expand_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let pattern = path.join("**").join("*.pdf");
            let pattern = pattern
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Non UTF-8 path: {}", path.display()))?;
            let mut found: Vec<PathBuf> = glob(pattern)?.filter_map(|r| r.ok()).collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}
