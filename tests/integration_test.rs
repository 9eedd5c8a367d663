// Integration tests for evidx
use evidx::prelude::*;
use evidx::{load_batch, load_config, InputWidths};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

fn batch_json() -> serde_json::Value {
    serde_json::json!({
        "ids": ["a", "b", "c"],
        "semantic": [[-1, 0], [0, 0], [-1, 0]],
        "pos": [[4, 1, 3], [0, 0, 0], [2, 2, 0]],
        "morphfeats": [[2, 1, 1], [0, 0, 0], [3, 0, 0]],
        "feats4": [[1, 1, 2], [0, 0, 0], [3, 0, 0]],
        "phonetic": [[10, 5], [2, 1], [1, 1]],
        "charfreq": [[300, 150], [1, 1], [1, 0]],
        "bigramfreq": [[4, 4], [4, 0], [4, 1]],
        "wordfreq": [[2, 2], [1, 0], [0, 0]],
        "morphamb": [[0, 1], [0, 1], [0, 1]],
        "txtlen": [[0, 10]],
        "dialect": [[-128, 127]],
        "emoji": [[1, 1], [1, 0], [1, 1]],
        "grammar": [[7, 8, 9], [7, 8, 1], [0, 0, 0]],
        "biblio": [[5], [5], [6]],
        "score": [0.1, 0.8, 0.4]
    })
}

fn three_row_batch() -> serde_json::Value {
    let mut value = batch_json();
    value["txtlen"] = serde_json::json!([[0, 10], [1, 1], [2, 2]]);
    value["dialect"] = serde_json::json!([[-128, 127], [0, 0], [0, 0]]);
    value
}

#[test]
fn test_load_batch_from_file() {
    let file = write_json(&three_row_batch());
    let raw = load_batch(file.path()).unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw.ids, vec!["a", "b", "c"]);
    // source column name accepted as alias
    assert_eq!(raw.syntax, vec![vec![1, 1, 2], vec![0, 0, 0], vec![3, 0, 0]]);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_batch(dir.path().join("nope.json")).is_err());
}

#[test]
fn test_mismatched_row_counts_rejected() {
    // txtlen and dialect only carry one row here
    let file = write_json(&batch_json());
    let raw = load_batch(file.path()).unwrap();
    let err = FeatureBatch::from_raw(&raw).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_dense_decode_end_to_end() {
    let file = write_json(&three_row_batch());
    let raw = load_batch(file.path()).unwrap();
    let batch = FeatureBatch::from_raw(&raw).unwrap();
    let decoded = FeatureAssembler::new(DecodeMode::Dense).assemble(&batch).unwrap();
    let dense = decoded.as_dense().unwrap();

    // 16 bits, syntax 3, divide-by-first families 2 + 2 + 1 * 6, txtlen 2, dialect 2
    assert_eq!(dense.width(), 16 + 3 + 10 + 2 + 2);
    assert_eq!(dense.rows(), 3);

    let row = dense.row(0);
    // 0xFF then 0x00
    assert!(row[..8].iter().all(|&v| v == 1.0));
    assert!(row[8..16].iter().all(|&v| v == 0.0));

    let syntax = dense.family_slice(0, FeatureFamily::Syntax).unwrap();
    assert_eq!(syntax.to_vec(), vec![0.25, 0.25, 0.5]);

    let pos = dense.family_slice(0, FeatureFamily::Pos).unwrap();
    assert_eq!(pos.to_vec(), vec![0.25, 0.75]);

    // divide by zero denominator yields zeros
    assert_eq!(dense.family_slice(1, FeatureFamily::Pos).unwrap().to_vec(), vec![0.0, 0.0]);

    let txtlen = dense.family_slice(0, FeatureFamily::TxtLen).unwrap();
    assert_eq!(txtlen[0], 0.0);
    assert!((txtlen[1] - 11f32.ln()).abs() < 1e-6);

    let dialect = dense.family_slice(0, FeatureFamily::Dialect).unwrap();
    assert_eq!(dialect.to_vec(), vec![1.0, 0.0]);
}

#[test]
fn test_keyed_decode_keeps_raw_values() {
    let file = write_json(&three_row_batch());
    let raw = load_batch(file.path()).unwrap();
    let batch = FeatureBatch::from_raw(&raw).unwrap();
    let decoded = FeatureAssembler::new(DecodeMode::Keyed).assemble(&batch).unwrap();
    let keyed = decoded.as_keyed().unwrap();

    assert_eq!(keyed.len(), 12);
    let char_freq = keyed.get(FeatureFamily::CharFreq).unwrap();
    assert_eq!(char_freq.as_int16().unwrap().row(0).to_vec(), vec![300, 150]);

    let json = serde_json::to_value(&decoded).unwrap();
    assert_eq!(json["mode"], "keyed");
    assert_eq!(json["semantic"][0], serde_json::json!([-1, 0]));
}

#[test]
fn test_value_out_of_declared_range() {
    let mut value = three_row_batch();
    value["pos"][1][0] = serde_json::json!(200);
    let file = write_json(&value);
    let raw = load_batch(file.path()).unwrap();
    let err = FeatureBatch::from_raw(&raw).unwrap_err();
    assert!(matches!(err, Error::Domain { value: 200, .. }));
}

#[test]
fn test_empty_batch_with_widths() {
    let file = write_json(&serde_json::json!({}));
    let raw = load_batch(file.path()).unwrap();
    assert!(raw.is_empty());

    let mut widths = InputWidths::new();
    for family in FeatureFamily::ALL {
        widths = widths.with(family, 4);
    }
    let batch = FeatureBatch::from_raw_with_widths(&raw, Some(&widths)).unwrap();
    let dense = FeatureAssembler::dense(&batch).unwrap();
    assert_eq!(dense.rows(), 0);
    // 32 bits + 8 families at 3 + 3 families at 4
    assert_eq!(dense.width(), 32 + 8 * 3 + 3 * 4);
}

#[test]
fn test_similarity_report_end_to_end() {
    let file = write_json(&three_row_batch());
    let raw = load_batch(file.path()).unwrap();
    let report = SimilarityReport::compute(&raw, &Selection::default(), &SimilarityEngine::default(), None).unwrap();

    assert_eq!(report.indices, vec![1, 2, 0]);
    assert_eq!(report.ids, vec!["b", "c", "a"]);

    // semantic rows b=[0x00,0x00], c=[0xFF,0x00], a=[0xFF,0x00]
    assert_eq!(report.semantic.get(0, 1), 0.5);
    assert_eq!(report.semantic.get(1, 2), 1.0);
    for i in 0..3 {
        assert_eq!(report.semantic.get(i, i), 1.0);
    }

    // grammar b=[7,8,1], c=[0,0,0], a=[7,8,9]
    let grammar = report.hash_matrix(HashFamily::Grammar).unwrap();
    assert!((grammar.get(0, 2) - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(grammar.get(0, 1), 0.0);

    let biblio = report.hash_matrix(HashFamily::Biblio).unwrap();
    assert_eq!(biblio.get(0, 2), 1.0);
    assert!(report.hash_matrix(HashFamily::Duplicate).is_none());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["simi-semantic"].as_array().unwrap().len(), 3);
    assert!(json.get("simi-duplicate").is_none());
}

#[test]
fn test_similarity_with_config_file() {
    let config_file = write_json(&serde_json::json!({
        "engine": {"parallel_threshold": 1, "block_rows": 1},
        "selection": {"limit": 2, "offset": 1}
    }));
    let config = load_config(config_file.path()).unwrap();
    assert_eq!(config.selection, Selection::top(2).with_offset(1));

    let batch_file = write_json(&three_row_batch());
    let raw = load_batch(batch_file.path()).unwrap();
    let engine = SimilarityEngine::new(config.engine).unwrap();
    let report = SimilarityReport::compute(&raw, &config.selection, &engine, None).unwrap();

    assert_eq!(report.indices, vec![2, 0]);
    assert_eq!(report.semantic.to_rows(), vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
}

#[test]
fn test_invalid_config_rejected() {
    let file = write_json(&serde_json::json!({"engine": {"block_rows": 0}}));
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_cancelled_report() {
    let file = write_json(&three_row_batch());
    let raw = load_batch(file.path()).unwrap();
    let token = CancelToken::new();
    token.cancel();
    let err = SimilarityReport::compute(&raw, &Selection::all(), &SimilarityEngine::default(), Some(&token))
        .unwrap_err();
    assert_eq!(err, Error::Cancelled);
}

#[test]
fn test_parallel_matches_sequential() {
    let rows: Vec<Vec<i32>> = (0..150).map(|i| vec![i % 3, i % 5, i % 7, 1]).collect();
    let x = Matrix::from_rows(&rows).unwrap();

    let sequential = SimilarityEngine::new(EngineConfig {
        parallel_threshold: usize::MAX,
        block_rows: 16,
    })
    .unwrap()
    .compute(&x);
    let parallel = SimilarityEngine::new(EngineConfig {
        parallel_threshold: 1,
        block_rows: 7,
    })
    .unwrap()
    .compute(&x);

    assert_eq!(sequential, parallel);
    assert_eq!(sequential.get(0, 105), 1.0);
}
