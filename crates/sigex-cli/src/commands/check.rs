//! Check command - inspect per-field extraction quality of an artifact.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;

use sigex_core::extraction::{load_artifact, ExtractionSummary};
use sigex_core::mapping::value_to_string;

use super::{load_settings, styled_status};

const MAX_LIST_ITEMS: usize = 3;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Company id; reads its raw artifact
    company: Option<String>,

    /// Artifact to check (raw or mapped)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Only report this field
    #[arg(short, long)]
    field: Option<String>,

    /// Sample values shown per field
    #[arg(long, default_value = "5")]
    samples: usize,

    /// Failed document ids shown per field
    #[arg(long, default_value = "5")]
    failures: usize,
}

pub async fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;
    let input = match (args.input, args.company.as_deref()) {
        (Some(path), _) => path,
        (None, Some(company)) => settings.paths.raw_artifact(company),
        (None, None) => anyhow::bail!("Either a company or --input is required"),
    };

    let artifact = load_artifact(&input)?;
    let summary = ExtractionSummary::from_artifact(&artifact, settings.extraction.success_threshold);

    if let Some(field) = &args.field {
        if !summary.fields.contains_key(field) {
            anyhow::bail!("Field '{}' not found in {}", field, input.display());
        }
    }

    println!("{} {}", style("Checking").bold(), input.display());
    for (name, stats) in summary.ranked() {
        if args.field.as_deref().is_some_and(|f| f != name) {
            continue;
        }

        println!();
        println!("{} {}: {}", styled_status(stats.status(summary.threshold)), style(name).bold(), stats);

        let Some(documents) = artifact.get(name).and_then(Value::as_object) else {
            continue;
        };
        for (doc_id, value) in documents.iter().filter(|(_, v)| !v.is_null()).take(args.samples) {
            println!("    {} {}", style(format!("{}:", doc_id)).dim(), format_sample(value));
        }

        let failed: Vec<&str> = documents
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(id, _)| id.as_str())
            .collect();
        if !failed.is_empty() {
            let shown = failed.iter().take(args.failures).copied().collect::<Vec<_>>().join(", ");
            let more = failed.len().saturating_sub(args.failures);
            if more > 0 {
                println!("    {} {} (+{} more)", style("missing:").red(), shown, more);
            } else {
                println!("    {} {}", style("missing:").red(), shown);
            }
        }
    }

    if args.field.is_none() {
        println!();
        println!(
            "Working fields: {}/{} ({:.1}%) at {:.0}% threshold",
            summary.working_fields(),
            summary.fields.len(),
            summary.completion_rate(),
            summary.threshold
        );
    }

    Ok(())
}

/// One-line rendering of a sample value; lists show their first few items.
fn format_sample(value: &Value) -> String {
    match value {
        Value::Array(items) if items.len() > MAX_LIST_ITEMS => {
            let head: Vec<String> = items[..MAX_LIST_ITEMS].iter().map(value_to_string).collect();
            format!("[{}] (+{} more)", head.join(" | "), items.len() - MAX_LIST_ITEMS)
        }
        Value::Array(items) => {
            let all: Vec<String> = items.iter().map(value_to_string).collect();
            format!("[{}]", all.join(" | "))
        }
        other => value_to_string(other),
    }
}
