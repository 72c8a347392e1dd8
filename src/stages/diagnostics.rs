use std::path::{Path, PathBuf};

use crate::artifacts::dataset::Dataset;
use crate::classifier::ModelHandle;
use crate::sample::{DIAGNOSTIC_SEED, sample_indices};
use crate::schema::ImpactLevel;
use crate::stages::StageError;
use crate::stages::normalize::input_from_row;
use crate::stages::predict::predict;

/// Validation runs over at most this many rows, matching the size of the
/// held-out set the model was originally validated on.
pub const DIAGNOSTIC_SAMPLE_CAP: usize = 6000;

/// Square counts over the fixed label set; rows are true labels, columns
/// predicted labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[u64; 3]; 3],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self {
            counts: [[0; 3]; 3],
        }
    }

    pub fn labels() -> [ImpactLevel; 3] {
        ImpactLevel::ALL
    }

    pub fn record(&mut self, truth: ImpactLevel, predicted: ImpactLevel) {
        self.counts[truth.index()][predicted.index()] += 1;
    }

    pub fn count(&self, truth: ImpactLevel, predicted: ImpactLevel) -> u64 {
        self.counts[truth.index()][predicted.index()]
    }

    /// Per-class support in the tabulated sample.
    pub fn row_total(&self, truth: ImpactLevel) -> u64 {
        self.counts[truth.index()].iter().sum()
    }

    pub fn col_total(&self, predicted: ImpactLevel) -> u64 {
        self.counts.iter().map(|row| row[predicted.index()]).sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let hits: u64 = ImpactLevel::ALL
            .iter()
            .map(|&l| self.count(l, l))
            .sum();
        hits as f64 / total as f64
    }

    pub fn precision(&self, label: ImpactLevel) -> f64 {
        let predicted = self.col_total(label);
        if predicted == 0 {
            return 0.0;
        }
        self.count(label, label) as f64 / predicted as f64
    }

    pub fn recall(&self, label: ImpactLevel) -> f64 {
        let support = self.row_total(label);
        if support == 0 {
            return 0.0;
        }
        self.count(label, label) as f64 / support as f64
    }

    pub fn f1(&self, label: ImpactLevel) -> f64 {
        let p = self.precision(label);
        let r = self.recall(label);
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Averaged equally across classes regardless of support.
    pub fn macro_precision(&self) -> f64 {
        let sum: f64 = ImpactLevel::ALL.iter().map(|&l| self.precision(l)).sum();
        sum / ImpactLevel::ALL.len() as f64
    }

    pub fn macro_recall(&self) -> f64 {
        let sum: f64 = ImpactLevel::ALL.iter().map(|&l| self.recall(l)).sum();
        sum / ImpactLevel::ALL.len() as f64
    }
}

impl Default for ConfusionMatrix {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub label: ImpactLevel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

#[derive(Debug, Clone)]
pub struct ValidationMetrics {
    pub matrix: ConfusionMatrix,
    /// Rows drawn from the dataset.
    pub rows_sampled: usize,
    /// Sampled rows whose true label fell outside the fixed label set.
    pub rows_excluded: usize,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub per_class: Vec<ClassMetrics>,
}

/// A precomputed rendering takes precedence over recomputation.
#[derive(Debug, Clone)]
pub enum ConfusionReport {
    Precomputed(PathBuf),
    Computed(ValidationMetrics),
}

pub fn assemble_confusion(
    model: &ModelHandle,
    dataset: &Dataset,
    precomputed_image: Option<&Path>,
) -> Result<ConfusionReport, StageError> {
    if let Some(path) = precomputed_image {
        if path.exists() {
            tracing::info!("using precomputed confusion matrix at {}", path.display());
            return Ok(ConfusionReport::Precomputed(path.to_path_buf()));
        }
    }
    compute_validation(model, dataset).map(ConfusionReport::Computed)
}

/// Deterministic sample, full prediction pass, tabulation. Any prediction
/// failure aborts the whole computation; a partially filled matrix is never
/// returned.
pub fn compute_validation(
    model: &ModelHandle,
    dataset: &Dataset,
) -> Result<ValidationMetrics, StageError> {
    let k = DIAGNOSTIC_SAMPLE_CAP.min(dataset.len());
    let indices = sample_indices(dataset.len(), k, DIAGNOSTIC_SEED);

    let mut matrix = ConfusionMatrix::new();
    let mut excluded = 0usize;
    for idx in &indices {
        let row = &dataset.rows()[*idx];
        let Some(truth) = ImpactLevel::parse(&row.impact_label) else {
            // Labels outside the fixed set never expand the matrix.
            excluded += 1;
            continue;
        };
        let result = predict(model, &input_from_row(row))?;
        matrix.record(truth, result.label);
    }

    if matrix.total() == 0 {
        return Err(StageError::InvalidInput(
            "sample contains no rows with a known impact label".to_string(),
        ));
    }
    if excluded > 0 {
        tracing::warn!("{excluded} sampled rows had labels outside the fixed label set");
    }

    let per_class = ImpactLevel::ALL
        .iter()
        .map(|&label| ClassMetrics {
            label,
            precision: matrix.precision(label),
            recall: matrix.recall(label),
            f1: matrix.f1(label),
            support: matrix.row_total(label),
        })
        .collect();

    Ok(ValidationMetrics {
        accuracy: matrix.accuracy(),
        macro_precision: matrix.macro_precision(),
        macro_recall: matrix.macro_recall(),
        per_class,
        rows_sampled: indices.len(),
        rows_excluded: excluded,
        matrix,
    })
}

#[derive(Debug, Clone)]
pub struct ImportanceEntry {
    pub name: String,
    pub importance: f64,
}

/// Visible marker that the reconstructed names and the raw importance
/// vector disagreed in length and were reconciled to the vector length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMismatch {
    pub reconstructed: usize,
    pub vector_len: usize,
}

#[derive(Debug, Clone)]
pub struct FeatureImportance {
    /// Sorted descending by importance; ties keep expansion order.
    pub entries: Vec<ImportanceEntry>,
    pub mismatch: Option<NameMismatch>,
}

impl FeatureImportance {
    pub fn top(&self, n: usize) -> &[ImportanceEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// Pair the model's raw importance vector with reconstructed column names.
/// A length mismatch (the importance vector of a different model version,
/// for example) is reconciled to the vector length and flagged, not fatal.
pub fn assemble_importance(model: &ModelHandle, dataset: &Dataset) -> FeatureImportance {
    warn_unseen_categories(model, dataset);

    let mut names = model.expansion.display_names();
    let vector = &model.feature_importances;

    let mismatch = if names.len() != vector.len() {
        tracing::warn!(
            "reconstructed {} feature names for {} importance values; reconciling to the vector",
            names.len(),
            vector.len()
        );
        Some(NameMismatch {
            reconstructed: names.len(),
            vector_len: vector.len(),
        })
    } else {
        None
    };

    names.truncate(vector.len());
    while names.len() < vector.len() {
        names.push(format!("feature {}", names.len()));
    }

    let mut entries: Vec<ImportanceEntry> = names
        .into_iter()
        .zip(vector.iter().copied())
        .map(|(name, importance)| ImportanceEntry { name, importance })
        .collect();
    entries.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    FeatureImportance { entries, mismatch }
}

/// Cross-check the dataset's observed category values against the model's
/// expansion spec so unseen-category risk is visible in the logs.
fn warn_unseen_categories(model: &ModelHandle, dataset: &Dataset) {
    for block in &model.expansion.categorical {
        let Some(observed) = dataset.distinct_values(&block.feature) else {
            continue;
        };
        for value in observed {
            if !block.values.contains(value) {
                tracing::warn!(
                    "dataset {} value {:?} is not covered by the model's expansion spec",
                    block.feature,
                    value
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stages/diagnostics.rs"]
mod tests;
