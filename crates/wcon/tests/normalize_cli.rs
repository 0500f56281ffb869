use std::fs;

use serde_json::{json, Value};
use wcon::cli::{normalize_json, read_input, write_output, CliError, Config};
use wcon::{DataLayout, NormalizeError, NormalizeOptions};

const CEMEE_SAMPLE: &str = r#"{
    "metadata": {"lab": "EEV"},
    "units": {"t": "s", "x": "mm", "y": "mm", "food": "OP50"},
    "data": {
        "2": {"id": 4, "t": [[0.5]], "x": [[1.5]], "y": [[2.5]], "@MWT": {"speed": [[0.1]]}},
        "0": {"id": 1, "t": [[0.0, 0.1]], "x": [[1, 2]], "y": [[3, 4]]}
    }
}"#;

#[test]
fn normalize_json_produces_canonical_wcon() {
    let out = normalize_json(CEMEE_SAMPLE, "sample.wcon", &NormalizeOptions::default(), false)
        .unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        doc,
        json!({
            "metadata": {"lab": {"name": "EEV"}, "food": "OP50"},
            "units": {"t": "s", "x": "mm", "y": "mm"},
            "data": [
                {"id": "1", "t": [0.0, 0.1], "x": [1, 2], "y": [3, 4]},
                null,
                {"id": "4", "t": [0.5], "x": [1.5], "y": [2.5], "@MWT": {"speed": [0.1]}}
            ]
        })
    );
}

#[test]
fn normalize_json_dense_layout() {
    let options = NormalizeOptions::default().with_layout(DataLayout::Dense);
    let out = normalize_json(CEMEE_SAMPLE, "sample.wcon", &options, true).unwrap();
    assert!(out.contains('\n'));
    let doc: Value = serde_json::from_str(&out).unwrap();
    let ids: Vec<&str> = doc["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["4", "1"]);
}

#[test]
fn normalize_json_attaches_source_name() {
    let text = r#"{"data": {"9": {"id": 1, "t": 0, "x": [[0]], "y": [[0]]}}}"#;
    let err = normalize_json(text, "LSJ2_20190705_105444.wcon", &NormalizeOptions::default(), false)
        .unwrap_err();
    match &err {
        CliError::Normalize { source_name, error } => {
            assert_eq!(source_name, "LSJ2_20190705_105444.wcon");
            assert_eq!(error.record_index(), Some(9));
            assert!(matches!(error, NormalizeError::NotWrapped { .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "LSJ2_20190705_105444.wcon: expected a non-empty list to unwrap at /data/9/t"
    );
}

#[test]
fn normalize_json_rejects_unwalkable_index() {
    let text = r#"{"data": {"18446744073709551615": {"id": 1, "t": [[0]], "x": [[0]], "y": [[0]]}}}"#;
    let err = normalize_json(text, "huge.wcon", &NormalizeOptions::default(), false).unwrap_err();
    assert!(matches!(
        err,
        CliError::Normalize { error: NormalizeError::InvalidIndex { .. }, .. }
    ));
}

#[test]
fn normalize_json_rejects_invalid_json() {
    let err = normalize_json("{", "broken.wcon", &NormalizeOptions::default(), false).unwrap_err();
    assert!(matches!(err, CliError::Json { .. }));
    assert!(err.to_string().starts_with("broken.wcon: "));
}

#[test]
fn config_loads_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wcon.toml");
    fs::write(
        &path,
        "[normalize]\ndata_layout = \"dense\"\nextension_key = \"@OMG\"\n\n[output]\npretty = true\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.normalize.data_layout, DataLayout::Dense);
    assert_eq!(config.normalize.extension_key, "@OMG");
    assert_eq!(config.normalize.unwrap_fields, vec!["t", "x", "y"]);
    assert!(config.output.pretty);
}

#[test]
fn config_load_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[normalize]\ndata_layout = \"diagonal\"\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CliError::Config { .. }));
    assert!(err.to_string().contains("bad.toml"));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(Config::load(&missing).unwrap_err(), CliError::Io { .. }));
}

#[test]
fn file_round_trip_through_filter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("LSJ2.wcon");
    let output = dir.path().join("LSJ2.out.wcon");
    fs::write(&input, CEMEE_SAMPLE).unwrap();

    let (text, name) = read_input(Some(&input)).unwrap();
    assert!(name.ends_with("LSJ2.wcon"));
    let out = normalize_json(&text, &name, &NormalizeOptions::default(), false).unwrap();
    write_output(Some(&output), &out).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.ends_with('\n'));
    let doc: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(doc["data"].as_array().unwrap().len(), 3);
}
