//! CLI application for insurance policy field extraction and normalization.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{check, config, detect, extract, map, run, test_pattern};

/// Extract structured fields from insurance policy PDFs and normalize them
#[derive(Parser)]
#[command(name = "sigex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to settings file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract configured fields from a company's PDFs
    Extract(extract::ExtractArgs),

    /// Normalize a raw extraction artifact with mapping rules
    Map(map::MapArgs),

    /// Report per-field success rates of an artifact
    Check(check::CheckArgs),

    /// Try an ad-hoc pattern against a company's first documents
    TestPattern(test_pattern::TestPatternArgs),

    /// Extract and map one or more companies
    Run(run::RunArgs),

    /// Detect the insurer of PDF files
    Detect(detect::DetectArgs),

    /// Manage settings
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Map(args) => map::run(args, config_path).await,
        Commands::Check(args) => check::run(args, config_path).await,
        Commands::TestPattern(args) => test_pattern::run(args, config_path).await,
        Commands::Run(args) => run::run(args, config_path).await,
        Commands::Detect(args) => detect::run(args).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
