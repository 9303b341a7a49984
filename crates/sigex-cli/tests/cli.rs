use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

fn sigex() -> Command {
    Command::cargo_bin("sigex").unwrap()
}

/// Settings file whose directories all live under `root`.
fn write_settings(root: &Path) -> PathBuf {
    let settings = json!({
        "paths": {
            "config_dir": root.join("config"),
            "pdf_dir": root.join("pdfs"),
            "output_dir": root.join("output"),
            "mapped_dir": root.join("mapped")
        }
    });
    let path = root.join("settings.json");
    fs::write(&path, settings.to_string()).unwrap();
    path
}

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn raw_artifact() -> Value {
    json!({
        "Plaka": {"doc1": "34 ABC 123", "doc2": "06 XYZ 42", "doc3": null},
        "Kasko Türü": {"doc1": "Genişletilmiş Kasko", "doc2": null, "doc3": null},
        "Limit": {"doc1": "500.000,00", "doc2": "SINIRSIZ", "doc3": "1.250.000,50"}
    })
}

#[test]
fn test_help_lists_subcommands() {
    sigex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("test-pattern"))
        .stdout(predicate::str::contains("detect"));
}

#[test]
fn test_check_reports_field_rates() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    let input = dir.path().join("raw.json");
    write_json(&input, &raw_artifact());

    sigex()
        .arg("--config")
        .arg(&settings)
        .arg("check")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Limit: 100.0% (3/3)"))
        .stdout(predicate::str::contains("[WARN] Plaka: 66.7% (2/3)"))
        .stdout(predicate::str::contains("[WARN] Kasko Türü: 33.3% (1/3)"))
        .stdout(predicate::str::contains("missing: doc2, doc3"))
        .stdout(predicate::str::contains("Working fields: 1/3"));
}

#[test]
fn test_check_unknown_field_fails() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    let input = dir.path().join("raw.json");
    write_json(&input, &raw_artifact());

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["check", "--field", "Prim", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Field 'Prim' not found"));
}

#[test]
fn test_map_writes_mapped_artifact() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    let input = dir.path().join("raw.json");
    let output = dir.path().join("out").join("mapped.json");
    let mapping = dir.path().join("ak_E_map.json");
    write_json(&input, &raw_artifact());
    write_json(
        &mapping,
        &json!({
            "company": "ak_E",
            "version": "1.1",
            "field_mappings": {
                "Kasko Türü": {"type": "pattern_to_value", "mappings": [
                    {"input_pattern": "genişletilmiş", "output": "GENIS"},
                    {"input_pattern": null, "output": "BILINMIYOR"}
                ]},
                "Limit": {"type": "numeric_conversion", "turkish_format": true,
                    "mappings": [{"input_pattern": "SINIRSIZ", "output": -1}]}
            }
        }),
    );

    sigex()
        .arg("--config")
        .arg(&settings)
        .arg("map")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 3/3 fields successfully"));

    let mapped: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        mapped["Kasko Türü"],
        json!({"doc1": "GENIS", "doc2": "BILINMIYOR", "doc3": "BILINMIYOR"})
    );
    assert_eq!(mapped["Limit"], json!({"doc1": 500000, "doc2": -1, "doc3": 1250000}));
    assert_eq!(mapped["Plaka"], raw_artifact()["Plaka"]);
    assert_eq!(mapped["_mapping_metadata"]["company"], json!("ak_E"));
    assert_eq!(mapped["_mapping_metadata"]["config_version"], json!("1.1"));
}

#[test]
fn test_map_rejects_invalid_rules() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    let input = dir.path().join("raw.json");
    let mapping = dir.path().join("bad_map.json");
    write_json(&input, &raw_artifact());
    write_json(
        &mapping,
        &json!({"field_mappings": {"Limit": {"type": "amount_normalization", "mappings": [
            {"pattern": "([\\d.]+)", "transform": "shout"}
        ]}}}),
    );

    sigex()
        .arg("--config")
        .arg(&settings)
        .arg("map")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown transform"));
}

#[test]
fn test_map_requires_company_or_paths() {
    sigex()
        .args(["map", "--input", "raw.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Either a company or --output is required"));
}

#[test]
fn test_extract_empty_company_directory_fails() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    fs::create_dir_all(dir.path().join("pdfs").join("ak_E")).unwrap();

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["extract", "ak_E"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corpus error"));
}

#[test]
fn test_run_skip_extraction_without_mapping_config() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    write_json(&dir.path().join("output").join("ak_E.json"), &raw_artifact());

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["run", "--company", "ak_E", "--skip-extraction"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extraction skipped, no mapping config"));

    assert!(!dir.path().join("mapped").join("ak_E.json").exists());
}

#[test]
fn test_run_maps_with_company_config() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(dir.path());
    write_json(&dir.path().join("output").join("ak_E.json"), &raw_artifact());
    write_json(
        &dir.path().join("config").join("mapping_rules").join("ak_E_map.json"),
        &json!({"company": "ak_E", "field_mappings": {
            "Plaka": {"type": "fixed_value", "output": "VAR"}
        }}),
    );

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["run", "--company", "ak_E", "--company", "hdi_E", "--skip-extraction"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ak_E: extraction skipped, mapped"))
        .stdout(predicate::str::contains("hdi_E: No raw artifact"))
        .stdout(predicate::str::contains("(1 failed)"));

    let mapped: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("mapped").join("ak_E.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(mapped["Plaka"], json!({"doc1": "VAR", "doc2": "VAR", "doc3": "VAR"}));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("sigex").join("config.json");

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(settings.exists());

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["config", "set", "extraction.success_threshold", "90"])
        .assert()
        .success();

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["config", "get", "extraction.success_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("90"));

    sigex()
        .arg("--config")
        .arg(&settings)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
}
