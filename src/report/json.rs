use serde::Serialize;

use crate::report::DashboardReport;
use crate::stages::StageError;
use crate::stages::diagnostics::{ConfusionMatrix, ConfusionReport, FeatureImportance};
use crate::stages::predict::PredictionResult;
use crate::stages::stats::GroupStatistic;

#[derive(Debug, Serialize)]
struct Summary {
    tool: String,
    version: String,
    model_path: String,
    dataset_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dataset_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction: Option<Section<PredictionJson>>,
    confusion: Section<ConfusionJson>,
    feature_importance: Section<ImportanceJson>,
    patterns: Section<Vec<GroupJson>>,
}

#[derive(Debug, Serialize)]
struct Section<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> Section<T> {
    fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    fn err(err: &StageError) -> Self {
        Self {
            data: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictionJson {
    label: String,
    confidence: f64,
    probabilities: Vec<ClassProbability>,
    inputs: InputsJson,
}

#[derive(Debug, Serialize)]
struct ClassProbability {
    label: String,
    probability: f64,
}

#[derive(Debug, Serialize)]
struct InputsJson {
    industry: String,
    education: String,
    salary: f64,
    experience: f64,
    remote_ratio: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
enum ConfusionJson {
    Precomputed {
        image_path: String,
    },
    Computed {
        rows_sampled: usize,
        rows_excluded: usize,
        labels: Vec<String>,
        matrix: Vec<Vec<u64>>,
        accuracy: f64,
        macro_precision: f64,
        macro_recall: f64,
        per_class: Vec<ClassMetricsJson>,
    },
}

#[derive(Debug, Serialize)]
struct ClassMetricsJson {
    label: String,
    precision: f64,
    recall: f64,
    f1: f64,
    support: u64,
}

#[derive(Debug, Serialize)]
struct ImportanceJson {
    entries: Vec<ImportanceEntryJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_mismatch: Option<NameMismatchJson>,
}

#[derive(Debug, Serialize)]
struct ImportanceEntryJson {
    name: String,
    importance: f64,
}

#[derive(Debug, Serialize)]
struct NameMismatchJson {
    reconstructed: usize,
    vector_len: usize,
}

#[derive(Debug, Serialize)]
struct GroupJson {
    label: String,
    count: usize,
    mean_salary: f64,
    mean_experience: f64,
    mean_remote_ratio: f64,
}

pub fn render_summary_json(report: &DashboardReport) -> serde_json::Result<String> {
    let summary = Summary {
        tool: report.tool_name.clone(),
        version: report.tool_version.clone(),
        model_path: report.model_path.clone(),
        dataset_path: report.dataset_path.clone(),
        dataset_rows: report.dataset_rows,
        prediction: report.prediction.as_ref().map(|res| match res {
            Ok(p) => Section::ok(prediction_json(p)),
            Err(e) => Section::err(e),
        }),
        confusion: match &report.confusion {
            Ok(c) => Section::ok(confusion_json(c)),
            Err(e) => Section::err(e),
        },
        feature_importance: match &report.importance {
            Ok(i) => Section::ok(importance_json(i)),
            Err(e) => Section::err(e),
        },
        patterns: match &report.patterns {
            Ok(groups) => Section::ok(groups.iter().map(group_json).collect()),
            Err(e) => Section::err(e),
        },
    };
    serde_json::to_string_pretty(&summary)
}

fn prediction_json(result: &PredictionResult) -> PredictionJson {
    PredictionJson {
        label: result.label.as_str().to_string(),
        confidence: result.confidence(),
        probabilities: result
            .ranked()
            .into_iter()
            .map(|(label, probability)| ClassProbability {
                label: label.as_str().to_string(),
                probability,
            })
            .collect(),
        inputs: InputsJson {
            industry: result.input.industry.clone(),
            education: result.input.education.clone(),
            salary: result.input.salary,
            experience: result.input.experience,
            remote_ratio: result.input.remote_ratio,
        },
    }
}

fn confusion_json(report: &ConfusionReport) -> ConfusionJson {
    match report {
        ConfusionReport::Precomputed(path) => ConfusionJson::Precomputed {
            image_path: path.display().to_string(),
        },
        ConfusionReport::Computed(metrics) => {
            let labels = ConfusionMatrix::labels();
            ConfusionJson::Computed {
                rows_sampled: metrics.rows_sampled,
                rows_excluded: metrics.rows_excluded,
                labels: labels.iter().map(|l| l.as_str().to_string()).collect(),
                matrix: labels
                    .iter()
                    .map(|&truth| {
                        labels
                            .iter()
                            .map(|&pred| metrics.matrix.count(truth, pred))
                            .collect()
                    })
                    .collect(),
                accuracy: metrics.accuracy,
                macro_precision: metrics.macro_precision,
                macro_recall: metrics.macro_recall,
                per_class: metrics
                    .per_class
                    .iter()
                    .map(|c| ClassMetricsJson {
                        label: c.label.as_str().to_string(),
                        precision: c.precision,
                        recall: c.recall,
                        f1: c.f1,
                        support: c.support,
                    })
                    .collect(),
            }
        }
    }
}

fn importance_json(importance: &FeatureImportance) -> ImportanceJson {
    ImportanceJson {
        entries: importance
            .entries
            .iter()
            .map(|e| ImportanceEntryJson {
                name: e.name.clone(),
                importance: e.importance,
            })
            .collect(),
        name_mismatch: importance.mismatch.map(|m| NameMismatchJson {
            reconstructed: m.reconstructed,
            vector_len: m.vector_len,
        }),
    }
}

fn group_json(group: &GroupStatistic) -> GroupJson {
    GroupJson {
        label: group.label.as_str().to_string(),
        count: group.count,
        mean_salary: group.mean_salary,
        mean_experience: group.mean_experience,
        mean_remote_ratio: group.mean_remote_ratio,
    }
}
