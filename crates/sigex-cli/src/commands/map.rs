//! Map command - normalize a raw artifact with a company's mapping rules.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use sigex_core::mapping::{MappedArtifact, MappingConfig, MappingEngine};
use sigex_core::models::config::SigexSettings;
use sigex_core::pattern::PatternOptions;

use super::load_settings;

/// Arguments for the map command.
#[derive(Args)]
pub struct MapArgs {
    /// Company id; derives any path not given explicitly
    company: Option<String>,

    /// Raw extraction artifact
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path for the mapped artifact
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mapping configuration file
    #[arg(short, long)]
    mapping: Option<PathBuf>,
}

pub async fn run(args: MapArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let settings = load_settings(config_path)?;
    let company = args.company.as_deref();

    let missing = |what: &str| anyhow::anyhow!("Either a company or --{} is required", what);
    let input = args
        .input
        .or_else(|| company.map(|c| settings.paths.raw_artifact(c)))
        .ok_or_else(|| missing("input"))?;
    let output = args
        .output
        .or_else(|| company.map(|c| settings.paths.mapped_artifact(c)))
        .ok_or_else(|| missing("output"))?;
    let mapping = args
        .mapping
        .or_else(|| company.map(|c| settings.paths.mapping_config(c)))
        .ok_or_else(|| missing("mapping"))?;

    let engine = load_engine(&mapping, &settings)?;
    let mapped = engine.process_file(&input, &output)?;
    print_result(&mapped);
    println!("{} Output saved to {}", style("✓").green(), output.display());

    Ok(())
}

/// Map a company's raw artifact. `None` when the company has no mapping config.
pub fn map_company(company: &str, settings: &SigexSettings) -> anyhow::Result<Option<MappedArtifact>> {
    let mapping = settings.paths.mapping_config(company);
    if !mapping.exists() {
        info!("No mapping config for {}, skipping mapping", company);
        return Ok(None);
    }

    let engine = load_engine(&mapping, settings)?;
    let mapped = engine.process_file(
        &settings.paths.raw_artifact(company),
        &settings.paths.mapped_artifact(company),
    )?;
    Ok(Some(mapped))
}

fn load_engine(path: &std::path::Path, settings: &SigexSettings) -> anyhow::Result<MappingEngine> {
    let options = PatternOptions::plain().with_size_limit(settings.extraction.regex_size_limit);
    let config = MappingConfig::from_file_with_options(path, options)?;
    Ok(MappingEngine::new(config))
}

pub fn print_result(mapped: &MappedArtifact) {
    let meta = &mapped.metadata;
    let stats = &meta.processing_stats;
    println!(
        "{} Mapping completed for {} (config {})",
        style("✓").green(),
        style(&meta.company).bold(),
        meta.config_version
    );
    println!(
        "   Processed {}/{} fields successfully",
        stats.mapped_fields, stats.total_fields
    );
    if !stats.errors.is_empty() {
        println!("{} {} errors encountered", style("⚠").yellow(), stats.errors.len());
        for error in &stats.errors {
            println!("  - {}", error);
        }
    }
}
