//! Integration tests for the prediction pipeline
//!
//! Exercises the public library surface end to end without HTTP: schema
//! loading, presence validation, coercion, table assembly, and model
//! invocation, in the order the serving handler runs them.

use serde_json::{json, Value};
use tasar::model::{TreeModel, TreeNode};
use tasar::schema::FeatureSchema;
use tasar::table::FeatureTable;
use tasar::validate::{coerce_and_check, validate_presence};
use tasar::TasarError;

fn house_schema() -> FeatureSchema {
    FeatureSchema::from_json_str(
        r#"{"LotArea": "int", "YearBuilt": "int", "1stFlrSF": "int",
            "2ndFlrSF": "int", "FullBath": "int", "BedroomAbvGr": "int",
            "TotRmsAbvGrd": "int"}"#,
    )
    .expect("schema")
}

fn valid_record() -> Value {
    json!({
        "LotArea": 8450,
        "YearBuilt": 2003,
        "1stFlrSF": 856,
        "2ndFlrSF": 854,
        "FullBath": 2,
        "BedroomAbvGr": 3,
        "TotRmsAbvGrd": 8
    })
}

/// Run the full pipeline the way the handler does
fn run_pipeline(mut records: Vec<Value>) -> Result<Vec<f64>, TasarError> {
    let schema = house_schema();
    let model = TreeModel::demo()?;
    validate_presence(&records, &schema)?;
    coerce_and_check(&mut records, &schema)?;
    let table = FeatureTable::from_records(&records, &schema)?;
    model.predict(&table)
}

#[test]
fn test_valid_record_reaches_the_model() {
    let predictions = run_pipeline(vec![valid_record()]).expect("pipeline");
    assert_eq!(predictions.len(), 1);
    assert!(predictions[0].is_finite());
}

#[test]
fn test_batch_of_n_yields_n_predictions_in_order() {
    let mut records = Vec::new();
    for i in 0..4 {
        let mut record = valid_record();
        record["LotArea"] = json!(6000 + i * 5000);
        records.push(record);
    }
    let predictions = run_pipeline(records).expect("pipeline");
    assert_eq!(predictions.len(), 4);
    // lots 6000 and 11000 straddle the demo tree's 10000 split
    assert_ne!(predictions[0], predictions[1]);
}

#[test]
fn test_mixed_scalar_types_coerce_through_the_pipeline() {
    let mut record = valid_record();
    record["LotArea"] = json!("8450");
    record["YearBuilt"] = json!(2003.0);
    record["FullBath"] = json!(true);
    let predictions = run_pipeline(vec![record]).expect("pipeline");
    assert_eq!(predictions.len(), 1);
}

#[test]
fn test_presence_failure_stops_before_coercion() {
    let err = run_pipeline(vec![json!({})]).unwrap_err();
    assert!(matches!(err, TasarError::Validation { .. }));
    assert!(err.to_string().contains("Missing required fields"));
}

#[test]
fn test_coercion_failure_stops_before_assembly() {
    let mut record = valid_record();
    record["TotRmsAbvGrd"] = json!("many");
    let err = run_pipeline(vec![record]).unwrap_err();
    assert!(err.to_string().contains("Type errors"));
}

#[test]
fn test_empty_batch_yields_empty_predictions() {
    let predictions = run_pipeline(vec![]).expect("pipeline");
    assert!(predictions.is_empty());
}

#[test]
fn test_schema_file_round_trip() {
    let dir = std::env::temp_dir().join("tasar_schema_test");
    std::fs::create_dir_all(&dir).expect("tempdir");
    let path = dir.join("features.json");
    std::fs::write(&path, r#"{"LotArea": "int", "Ratio": "float", "Zone": "str"}"#)
        .expect("write schema");

    let schema = FeatureSchema::load(&path).expect("load schema");
    let names: Vec<&str> = schema.field_names().collect();
    assert_eq!(names, vec!["LotArea", "Ratio", "Zone"]);
}

#[test]
fn test_model_file_round_trip() {
    let dir = std::env::temp_dir().join("tasar_model_test");
    std::fs::create_dir_all(&dir).expect("tempdir");
    let path = dir.join("model.json");
    let artifact = json!({
        "feature_names": ["LotArea"],
        "nodes": [
            {"feature": 0, "threshold": 5000.0, "left": 1, "right": 2},
            {"value": 100000.0},
            {"value": 200000.0}
        ]
    });
    std::fs::write(&path, artifact.to_string()).expect("write model");

    let model = TreeModel::load(&path).expect("load model");
    let schema = FeatureSchema::from_json_str(r#"{"LotArea": "int"}"#).expect("schema");
    let table =
        FeatureTable::from_records(&[json!({"LotArea": 8000})], &schema).expect("table");
    assert_eq!(model.predict(&table).expect("predict"), vec![200_000.0]);
}

#[test]
fn test_hand_built_tree_matches_artifact_tree() {
    let built = TreeModel::from_parts(
        vec!["LotArea".to_string()],
        vec![
            TreeNode::Split {
                feature: 0,
                threshold: 5000.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 100_000.0 },
            TreeNode::Leaf { value: 200_000.0 },
        ],
    )
    .expect("model");
    let schema = FeatureSchema::from_json_str(r#"{"LotArea": "int"}"#).expect("schema");
    let table =
        FeatureTable::from_records(&[json!({"LotArea": 3000})], &schema).expect("table");
    assert_eq!(built.predict(&table).expect("predict"), vec![100_000.0]);
}
