use crate::stages::StageError;
use crate::stages::diagnostics::{ConfusionReport, FeatureImportance};
use crate::stages::predict::PredictionResult;
use crate::stages::stats::GroupStatistic;

pub mod json;
pub mod text;

/// Everything one render cycle produced. Each section carries its own
/// outcome; a failed section degrades to an error message in place while
/// the rest of the report still renders.
#[derive(Debug)]
pub struct DashboardReport {
    pub tool_name: String,
    pub tool_version: String,
    pub model_path: String,
    pub dataset_path: String,
    pub dataset_rows: Option<usize>,
    /// None when no prediction was requested this cycle.
    pub prediction: Option<Result<PredictionResult, StageError>>,
    pub confusion: Result<ConfusionReport, StageError>,
    pub importance: Result<FeatureImportance, StageError>,
    pub patterns: Result<Vec<GroupStatistic>, StageError>,
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/tests.rs"]
mod tests;
