//! CLI Integration Tests
//!
//! These tests drive the command implementations directly against a
//! temporary measurement dump, verifying the end-to-end file outputs.
//!
//! `cargo test --package bodysync-cli --test cli_integration`

use std::fs;
use std::path::PathBuf;

use bodysync_cli::cli::{InputArgs, ReconcileArgs};
use bodysync_cli::commands::convert::{ConvertArgs, cmd_convert};
use bodysync_cli::config::Config;

const DUMP: &str = r#"{
    "status": 0,
    "body": {"measuregrps": [
        {"grpid": 1, "date": 1700000000, "category": 1,
         "measures": [
            {"value": 81000, "type": 1, "unit": -3},
            {"value": 2150, "type": 6, "unit": -2}
         ]},
        {"grpid": 2, "date": 1700000000, "category": 1,
         "measures": [{"value": 62, "type": 11, "unit": 0}]},
        {"grpid": 3, "date": 1700086400, "category": 1,
         "measures": [
            {"value": 80, "type": 9, "unit": 0},
            {"value": 120, "type": 10, "unit": 0}
         ]}
    ]}
}"#;

fn write_dump(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("dump.json");
    fs::write(&path, DUMP).unwrap();
    path
}

fn convert_args(input: PathBuf, output: PathBuf, features: &[&str]) -> ConvertArgs {
    ConvertArgs {
        input: InputArgs {
            input,
            from: None,
            to: None,
        },
        reconcile: ReconcileArgs {
            height: Some(1.80),
            features: features.iter().map(|s| s.to_string()).collect(),
            accept_unclassified: false,
        },
        output,
        to_fit: true,
        to_json: true,
        no_upload: true,
    }
}

#[test]
fn convert_writes_fit_and_json_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_dump(&dir);
    let output = dir.path().join("out");

    cmd_convert(
        convert_args(input, output.clone(), &["BLOOD_PRESSURE"]),
        &Config::default(),
    )
    .unwrap();

    let weight_path = dir.path().join("out.weight.fit");
    let bp_path = dir.path().join("out.blood_pressure.fit");
    let json_path = dir.path().join("out.json");
    assert!(weight_path.exists());
    assert!(bp_path.exists());
    assert!(json_path.exists());

    // The weight file is a valid container: magic in the header, checksum at
    // the end matching a recomputation.
    let bytes = fs::read(&weight_path).unwrap();
    assert_eq!(&bytes[8..12], b".FIT");
    let stored = u16::from_le_bytes([bytes[bytes.len() - 2], bytes[bytes.len() - 1]]);
    assert_eq!(
        bodysync_core::fit::crc16(0, &bytes[..bytes.len() - 2]),
        stored
    );

    // The report carries the merged record with its derived BMI.
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let first = report
        .as_object()
        .unwrap()
        .values()
        .next()
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(first["Weight"]["Value"], 81.0);
    assert_eq!(first["Weight"]["Unit"], "kg");
    assert_eq!(first["BMI"]["Value"], 25.0);
    assert_eq!(first["Heart Pulse"]["Value"], 62.0);
}

#[test]
fn convert_without_bp_feature_writes_no_bp_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_dump(&dir);
    let output = dir.path().join("out");

    cmd_convert(convert_args(input, output, &[]), &Config::default()).unwrap();

    assert!(dir.path().join("out.weight.fit").exists());
    assert!(!dir.path().join("out.blood_pressure.fit").exists());
}

#[test]
fn convert_fails_on_empty_range() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_dump(&dir);
    let output = dir.path().join("out");

    let mut args = convert_args(input, output, &[]);
    args.input.from = Some("2030-01-01".to_string());
    args.input.to = Some("2030-01-02".to_string());

    assert!(cmd_convert(args, &Config::default()).is_err());
}
