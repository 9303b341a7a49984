pub mod check;
pub mod config;
pub mod detect;
pub mod extract;
pub mod map;
pub mod run;
pub mod test_pattern;

use std::path::{Path, PathBuf};

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

use sigex_core::extraction::FieldStatus;
use sigex_core::models::config::SigexSettings;

/// Default settings location: `<config dir>/sigex/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sigex")
        .join("config.json")
}

/// Settings from `--config`, else the default file if present, else defaults.
pub fn load_settings(config_path: Option<&str>) -> anyhow::Result<SigexSettings> {
    if let Some(path) = config_path {
        return Ok(SigexSettings::from_file(Path::new(path))?);
    }
    let default_path = default_config_path();
    if default_path.exists() {
        return Ok(SigexSettings::from_file(&default_path)?);
    }
    Ok(SigexSettings::default())
}

pub fn styled_status(status: FieldStatus) -> StyledObject<FieldStatus> {
    match status {
        FieldStatus::Ok => style(status).green(),
        FieldStatus::Warn => style(status).yellow(),
        FieldStatus::Fail => style(status).red(),
    }
}

/// Spinner shown while a company's documents are processed.
pub fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

/// Bar over a known number of items.
pub fn progress_bar(len: usize, unit: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {}",
                unit
            ))?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
