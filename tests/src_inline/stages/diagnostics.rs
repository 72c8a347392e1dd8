use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::artifacts::dataset::{Dataset, JobRow};
use crate::classifier::expansion::{CategoricalExpansion, FeatureExpansionSpec};
use crate::classifier::forest::{Forest, Node, Tree};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!(
        "ai_impact_dash_diag_test_{}_{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn spec() -> FeatureExpansionSpec {
    FeatureExpansionSpec {
        version: 1,
        categorical: vec![
            CategoricalExpansion {
                feature: "Industry".to_string(),
                values: vec!["IT".to_string(), "Education".to_string()],
            },
            CategoricalExpansion {
                feature: "Required Education".to_string(),
                values: vec!["High School".to_string(), "Bachelor's Degree".to_string()],
            },
        ],
    }
}

/// Predicts Low for salaries at or below 100k, High above.
fn salary_split_model(importances: Vec<f64>) -> ModelHandle {
    let forest = Forest {
        trees: vec![Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 100_000.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    counts: vec![8.0, 1.0, 1.0],
                },
                Node::Leaf {
                    counts: vec![1.0, 1.0, 8.0],
                },
            ],
        }],
    };
    ModelHandle::new(ImpactLevel::ALL.to_vec(), spec(), forest, importances).unwrap()
}

fn row(salary: f64, label: &str) -> JobRow {
    JobRow {
        industry: "IT".to_string(),
        education: "High School".to_string(),
        salary,
        experience: 5.0,
        remote_ratio: 20.0,
        impact_label: label.to_string(),
    }
}

fn labeled_dataset() -> Dataset {
    Dataset::from_rows(vec![
        row(50_000.0, "Low"),
        row(60_000.0, "Low"),
        row(70_000.0, "Low"),
        row(120_000.0, "High"),
        row(130_000.0, "High"),
        row(90_000.0, "Moderate"),
        row(140_000.0, "Moderate"),
    ])
}

#[test]
fn test_confusion_counts_match_sample() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = labeled_dataset();
    let metrics = compute_validation(&model, &dataset).unwrap();

    assert_eq!(metrics.rows_sampled, 7);
    assert_eq!(metrics.rows_excluded, 0);
    assert_eq!(metrics.matrix.total(), 7);
    // row sums equal per-class support in the sample
    assert_eq!(metrics.matrix.row_total(ImpactLevel::Low), 3);
    assert_eq!(metrics.matrix.row_total(ImpactLevel::High), 2);
    assert_eq!(metrics.matrix.row_total(ImpactLevel::Moderate), 2);

    // the split model maps <=100k to Low, >100k to High
    assert_eq!(metrics.matrix.count(ImpactLevel::Low, ImpactLevel::Low), 3);
    assert_eq!(metrics.matrix.count(ImpactLevel::High, ImpactLevel::High), 2);
    assert_eq!(
        metrics.matrix.count(ImpactLevel::Moderate, ImpactLevel::Low),
        1
    );
    assert_eq!(
        metrics.matrix.count(ImpactLevel::Moderate, ImpactLevel::High),
        1
    );
    assert!((metrics.accuracy - 5.0 / 7.0).abs() < 1e-9);
}

#[test]
fn test_confusion_is_bit_identical_across_runs() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = labeled_dataset();
    let first = compute_validation(&model, &dataset).unwrap();
    let second = compute_validation(&model, &dataset).unwrap();
    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.accuracy.to_bits(), second.accuracy.to_bits());
}

#[test]
fn test_labels_outside_the_fixed_set_are_excluded() {
    let model = salary_split_model(vec![0.2; 7]);
    let mut rows = vec![
        row(50_000.0, "Low"),
        row(120_000.0, "High"),
        row(90_000.0, "Moderate"),
    ];
    rows.push(row(80_000.0, "Unknown"));
    rows.push(row(80_000.0, ""));
    let dataset = Dataset::from_rows(rows);

    let metrics = compute_validation(&model, &dataset).unwrap();
    assert_eq!(metrics.rows_sampled, 5);
    assert_eq!(metrics.rows_excluded, 2);
    assert_eq!(metrics.matrix.total(), 3);
}

#[test]
fn test_sample_with_no_known_labels_is_an_error() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = Dataset::from_rows(vec![row(50_000.0, "N/A"), row(60_000.0, "mixed")]);
    let err = compute_validation(&model, &dataset).unwrap_err();
    assert!(matches!(err, StageError::InvalidInput(_)));
}

#[test]
fn test_precomputed_image_short_circuits_recomputation() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = labeled_dataset();
    let dir = make_temp_dir();
    let image = dir.join("confusion_matrix.png");
    fs::write(&image, b"png").unwrap();

    match assemble_confusion(&model, &dataset, Some(&image)).unwrap() {
        ConfusionReport::Precomputed(path) => assert_eq!(path, image),
        other => panic!("expected precomputed report, got {other:?}"),
    }
}

#[test]
fn test_absent_image_falls_back_to_computation() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = labeled_dataset();
    let dir = make_temp_dir();
    let image = dir.join("absent.png");

    match assemble_confusion(&model, &dataset, Some(&image)).unwrap() {
        ConfusionReport::Computed(metrics) => assert_eq!(metrics.matrix.total(), 7),
        other => panic!("expected computed report, got {other:?}"),
    }
}

#[test]
fn test_matrix_metrics_on_known_counts() {
    let mut matrix = ConfusionMatrix::new();
    for _ in 0..2 {
        matrix.record(ImpactLevel::Low, ImpactLevel::Low);
    }
    matrix.record(ImpactLevel::Low, ImpactLevel::Moderate);
    for _ in 0..3 {
        matrix.record(ImpactLevel::Moderate, ImpactLevel::Moderate);
    }
    for _ in 0..4 {
        matrix.record(ImpactLevel::High, ImpactLevel::High);
    }

    assert_eq!(matrix.total(), 10);
    assert!((matrix.accuracy() - 0.9).abs() < 1e-9);
    assert!((matrix.precision(ImpactLevel::Low) - 1.0).abs() < 1e-9);
    assert!((matrix.recall(ImpactLevel::Low) - 2.0 / 3.0).abs() < 1e-9);
    assert!((matrix.precision(ImpactLevel::Moderate) - 0.75).abs() < 1e-9);
    assert!((matrix.recall(ImpactLevel::Moderate) - 1.0).abs() < 1e-9);
    let expected_macro_precision = (1.0 + 0.75 + 1.0) / 3.0;
    assert!((matrix.macro_precision() - expected_macro_precision).abs() < 1e-9);
    let expected_macro_recall = (2.0 / 3.0 + 1.0 + 1.0) / 3.0;
    assert!((matrix.macro_recall() - expected_macro_recall).abs() < 1e-9);
}

#[test]
fn test_empty_class_metrics_are_zero_not_nan() {
    let matrix = ConfusionMatrix::new();
    assert_eq!(matrix.precision(ImpactLevel::Low), 0.0);
    assert_eq!(matrix.recall(ImpactLevel::Low), 0.0);
    assert_eq!(matrix.f1(ImpactLevel::Low), 0.0);
    assert_eq!(matrix.accuracy(), 0.0);
}

#[test]
fn test_importance_is_sorted_descending_with_stable_ties() {
    let model = salary_split_model(vec![0.1, 0.3, 0.1, 0.5, 0.0, 0.0, 0.0]);
    let dataset = labeled_dataset();
    let importance = assemble_importance(&model, &dataset);

    assert!(importance.mismatch.is_none());
    assert_eq!(importance.entries.len(), 7);
    for pair in importance.entries.windows(2) {
        assert!(pair[0].importance >= pair[1].importance);
    }
    assert_eq!(importance.entries[0].name, "Industry: IT");
    assert_eq!(importance.entries[1].name, "Experience Required (Years)");
    // tied 0.1 entries keep expansion order
    assert_eq!(importance.entries[2].name, "Median Salary (USD)");
    assert_eq!(importance.entries[3].name, "Remote Work Ratio (%)");
}

#[test]
fn test_importance_length_mismatch_is_truncated_and_flagged() {
    let model = salary_split_model(vec![0.4, 0.3, 0.2, 0.1]);
    let dataset = labeled_dataset();
    let importance = assemble_importance(&model, &dataset);

    assert_eq!(
        importance.mismatch,
        Some(NameMismatch {
            reconstructed: 7,
            vector_len: 4,
        })
    );
    assert_eq!(importance.entries.len(), 4);
    assert_eq!(importance.entries[0].name, "Median Salary (USD)");
}

#[test]
fn test_importance_top_caps_at_available_entries() {
    let model = salary_split_model(vec![0.2; 7]);
    let dataset = labeled_dataset();
    let importance = assemble_importance(&model, &dataset);
    assert_eq!(importance.top(10).len(), 7);
    assert_eq!(importance.top(3).len(), 3);
}
