use std::path::PathBuf;

use super::*;
use crate::schema::{ImpactLevel, PredictionInput};
use crate::stages::diagnostics::{ConfusionReport, FeatureImportance, ImportanceEntry, NameMismatch};
use crate::stages::predict::PredictionResult;
use crate::stages::stats::GroupStatistic;

fn prediction() -> PredictionResult {
    PredictionResult {
        input: PredictionInput {
            industry: "IT".to_string(),
            education: "Bachelor's Degree".to_string(),
            salary: 90_000.0,
            experience: 10.0,
            remote_ratio: 50.0,
        },
        label: ImpactLevel::Low,
        classes: ImpactLevel::ALL.to_vec(),
        probabilities: vec![0.8, 0.1, 0.1],
    }
}

fn importance() -> FeatureImportance {
    FeatureImportance {
        entries: vec![
            ImportanceEntry {
                name: "Industry: IT".to_string(),
                importance: 0.5,
            },
            ImportanceEntry {
                name: "Median Salary (USD)".to_string(),
                importance: 0.2,
            },
        ],
        mismatch: Some(NameMismatch {
            reconstructed: 3,
            vector_len: 2,
        }),
    }
}

fn groups() -> Vec<GroupStatistic> {
    ImpactLevel::ALL
        .iter()
        .map(|&label| GroupStatistic {
            label,
            count: 10,
            mean_salary: 80_000.0,
            mean_experience: 9.0,
            mean_remote_ratio: 45.0,
        })
        .collect()
}

fn full_report() -> DashboardReport {
    DashboardReport {
        tool_name: "ai-impact-dash".to_string(),
        tool_version: "0.1.0".to_string(),
        model_path: "model.json".to_string(),
        dataset_path: "data.csv".to_string(),
        dataset_rows: Some(30),
        prediction: Some(Ok(prediction())),
        confusion: Ok(ConfusionReport::Precomputed(PathBuf::from(
            "confusion_matrix.png",
        ))),
        importance: Ok(importance()),
        patterns: Ok(groups()),
    }
}

#[test]
fn test_text_report_renders_all_sections() {
    let text = text::render_report_text(&full_report());
    assert!(text.contains("1. Interactive prediction"));
    assert!(text.contains("Predicted impact level: Low"));
    assert!(text.contains("Confidence: 80.00%"));
    assert!(text.contains("2. Model validation"));
    assert!(text.contains("precomputed rendering at confusion_matrix.png"));
    assert!(text.contains("Industry: IT"));
    assert!(text.contains("Warning: reconstructed 3 feature names"));
    assert!(text.contains("3. Dataset patterns"));
    assert!(text.contains("near-identical"));
}

#[test]
fn test_failed_sections_degrade_in_place() {
    let report = DashboardReport {
        prediction: Some(Err(crate::stages::StageError::InvalidInput(
            "bad category".to_string(),
        ))),
        confusion: Err(crate::stages::StageError::InvalidInput(
            "no labeled rows".to_string(),
        )),
        importance: Err(crate::stages::StageError::Artifact(
            crate::artifacts::ArtifactError::MissingArtifact(PathBuf::from("model.json")),
        )),
        patterns: Err(crate::stages::StageError::EmptyPartition(ImpactLevel::High)),
        ..full_report()
    };

    let text = text::render_report_text(&report);
    assert!(text.contains("Prediction unavailable: invalid input: bad category"));
    assert!(text.contains("Model validation unavailable"));
    assert!(text.contains("Feature importance unavailable: missing artifact: model.json"));
    assert!(text.contains("Dataset patterns unavailable: empty partition"));
}

#[test]
fn test_no_prediction_requested() {
    let report = DashboardReport {
        prediction: None,
        ..full_report()
    };
    let text = text::render_report_text(&report);
    assert!(text.contains("No prediction requested"));
}

#[test]
fn test_json_summary_parses() {
    let json = json::render_summary_json(&full_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["tool"], "ai-impact-dash");
    assert_eq!(value["dataset_rows"], 30);
    assert_eq!(value["prediction"]["data"]["label"], "Low");
    assert_eq!(value["confusion"]["data"]["source"], "precomputed");
    assert_eq!(
        value["feature_importance"]["data"]["name_mismatch"]["vector_len"],
        2
    );
    assert_eq!(value["patterns"]["data"].as_array().unwrap().len(), 3);
}

#[test]
fn test_json_summary_carries_section_errors() {
    let report = DashboardReport {
        patterns: Err(crate::stages::StageError::EmptyPartition(ImpactLevel::High)),
        ..full_report()
    };
    let json = json::render_summary_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(
        value["patterns"]["error"]
            .as_str()
            .unwrap()
            .contains("High")
    );
    assert!(value["patterns"].get("data").is_none());
}

#[test]
fn test_format_helpers() {
    assert_eq!(format_f64_6(0.5), "0.500000");
    assert_eq!(format_pct(0.8), "80.00%");
}
