//! Config command - inspect and edit the settings file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use sigex_core::models::config::SigexSettings;

use super::{default_config_path, load_settings};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings
    Show,

    /// Write a settings file with default values
    Init {
        /// Where to write the file (defaults to the active settings path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting by dotted key (e.g. "paths.pdf_dir")
    Get { key: String },

    /// Change one existing setting; the value is parsed as JSON when possible
    Set { key: String, value: String },

    /// Print the active settings path and whether it exists
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);
    match args.command {
        ConfigCommand::Show => print_setting(config_path, None),
        ConfigCommand::Get { key } => print_setting(config_path, Some(&key)),
        ConfigCommand::Init { output, force } => write_defaults(&output.unwrap_or(path), force),
        ConfigCommand::Set { key, value } => update_setting(&path, &key, &value),
        ConfigCommand::Path => {
            let status = if path.exists() {
                style("exists").green()
            } else {
                style("not created (run 'sigex config init')").yellow()
            };
            println!("{} [{}]", path.display(), status);
            Ok(())
        }
    }
}

/// Print the whole effective settings tree, or the subtree under `key`.
fn print_setting(config_path: Option<&str>, key: Option<&str>) -> anyhow::Result<()> {
    let tree = serde_json::to_value(load_settings(config_path)?)?;
    let node = match key {
        Some(key) => lookup(&tree, key).ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", key))?,
        None => &tree,
    };
    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}

fn write_defaults(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to replace it", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    SigexSettings::default().save(path)?;
    println!("{} Wrote default settings to {}", style("✓").green(), path.display());
    Ok(())
}

/// Replace an existing setting and save. Unknown keys are rejected so a typo
/// never silently creates a setting nothing reads.
fn update_setting(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let settings = if path.exists() {
        SigexSettings::from_file(path)?
    } else {
        SigexSettings::default()
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut tree = serde_json::to_value(&settings)?;
    let slot = lookup_mut(&mut tree, key).ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", key))?;
    *slot = value.clone();

    let settings: SigexSettings = serde_json::from_value(tree)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    settings.save(path)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(tree, |node, part| node.as_object()?.get(part))
}

fn lookup_mut<'a>(tree: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.')
        .try_fold(tree, |node, part| node.as_object_mut()?.get_mut(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree() -> Value {
        json!({"extraction": {"success_threshold": 80, "continue_on_error": false}, "name": "x"})
    }

    #[test]
    fn test_lookup_walks_dotted_keys() {
        let tree = tree();
        assert_eq!(lookup(&tree, "extraction.success_threshold"), Some(&json!(80)));
        assert_eq!(lookup(&tree, "name"), Some(&json!("x")));
        assert_eq!(lookup(&tree, "extraction.missing"), None);
        assert_eq!(lookup(&tree, "name.inner"), None);
    }

    #[test]
    fn test_lookup_mut_only_reaches_existing_keys() {
        let mut tree = tree();
        *lookup_mut(&mut tree, "extraction.continue_on_error").unwrap() = json!(true);
        assert_eq!(tree["extraction"]["continue_on_error"], json!(true));
        assert!(lookup_mut(&mut tree, "extraction.no_such_key").is_none());
        assert!(tree["extraction"].get("no_such_key").is_none());
    }

    #[test]
    fn test_update_setting_rejects_unknown_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        assert!(update_setting(&path, "extraction.no_such_key", "1").is_err());
        assert!(!path.exists());
    }
}
