//! Configuration structures for the extraction pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SigexError;
use crate::pattern::DEFAULT_REGEX_SIZE_LIMIT;

/// Main configuration for a sigex run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigexSettings {
    /// Directory layout.
    pub paths: PathsConfig,

    /// Extraction and reporting configuration.
    pub extraction: ExtractionSettings,
}

/// Where configurations, source documents, and artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of `extraction_patterns/` and `mapping_rules/`.
    pub config_dir: PathBuf,

    /// One sub-directory of PDFs per company.
    pub pdf_dir: PathBuf,

    /// Raw extraction artifacts.
    pub output_dir: PathBuf,

    /// Mapped artifacts.
    pub mapped_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            pdf_dir: PathBuf::from("data/00_raw_pdfs"),
            output_dir: PathBuf::from("data/02_output"),
            mapped_dir: PathBuf::from("data/03_mapped"),
        }
    }
}

impl PathsConfig {
    /// Extraction config, keyed by the lower-cased company id.
    pub fn extraction_config(&self, company: &str) -> PathBuf {
        self.config_dir
            .join("extraction_patterns")
            .join(format!("{}.json", company.to_lowercase()))
    }

    pub fn mapping_config(&self, company: &str) -> PathBuf {
        self.config_dir
            .join("mapping_rules")
            .join(format!("{}_map.json", company))
    }

    pub fn company_pdf_dir(&self, company: &str) -> PathBuf {
        self.pdf_dir.join(company)
    }

    pub fn raw_artifact(&self, company: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", company))
    }

    pub fn mapped_artifact(&self, company: &str) -> PathBuf {
        self.mapped_dir.join(format!("{}.json", company))
    }

    /// Company ids: every sub-directory of `pdf_dir`, sorted.
    pub fn list_companies(&self) -> Result<Vec<String>, SigexError> {
        let mut companies = Vec::new();
        for entry in fs::read_dir(&self.pdf_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    companies.push(name.to_string());
                }
            }
        }
        companies.sort();
        Ok(companies)
    }
}

/// Extraction and reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Success rate (percent) at or above which a field counts as working.
    pub success_threshold: f64,

    /// Compiled-program budget for each configured regex, in bytes.
    pub regex_size_limit: usize,

    /// Keep going when a document's text cannot be extracted.
    pub continue_on_error: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            success_threshold: 80.0,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            continue_on_error: false,
        }
    }
}

impl SigexSettings {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SigexError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SigexError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_company_paths() {
        let paths = PathsConfig::default();
        assert_eq!(
            paths.extraction_config("AK_E"),
            PathBuf::from("config/extraction_patterns/ak_e.json")
        );
        assert_eq!(
            paths.mapping_config("ak_E"),
            PathBuf::from("config/mapping_rules/ak_E_map.json")
        );
        assert_eq!(paths.raw_artifact("ak_E"), PathBuf::from("data/02_output/ak_E.json"));
        assert_eq!(paths.mapped_artifact("ak_E"), PathBuf::from("data/03_mapped/ak_E.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigex.json");
        fs::write(&path, r#"{"extraction": {"success_threshold": 90.0}}"#).unwrap();

        let settings = SigexSettings::from_file(&path).unwrap();
        assert_eq!(settings.extraction.success_threshold, 90.0);
        assert_eq!(settings.extraction.regex_size_limit, DEFAULT_REGEX_SIZE_LIMIT);
        assert_eq!(settings.paths.pdf_dir, PathBuf::from("data/00_raw_pdfs"));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigex.json");
        let mut settings = SigexSettings::default();
        settings.paths.config_dir = PathBuf::from("/etc/sigex");
        settings.save(&path).unwrap();

        let loaded = SigexSettings::from_file(&path).unwrap();
        assert_eq!(loaded.paths.config_dir, PathBuf::from("/etc/sigex"));
    }

    #[test]
    fn test_list_companies() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sompo_E")).unwrap();
        fs::create_dir(dir.path().join("ak_E")).unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let paths = PathsConfig {
            pdf_dir: dir.path().to_path_buf(),
            ..PathsConfig::default()
        };
        assert_eq!(paths.list_companies().unwrap(), vec!["ak_E", "sompo_E"]);
    }
}
