use std::fmt::Write;

use crate::report::{DashboardReport, format_f64_6, format_pct};
use crate::schema::{self, ImpactLevel};
use crate::stages::diagnostics::{ConfusionMatrix, ConfusionReport, FeatureImportance};
use crate::stages::predict::PredictionResult;
use crate::stages::stats::GroupStatistic;

pub fn render_report_text(report: &DashboardReport) -> String {
    let mut out = String::new();

    out.push_str("AI Job-Impact Dashboard Report\n");
    out.push_str("==============================\n\n");

    out.push_str("1. Interactive prediction\n");
    match &report.prediction {
        None => out.push_str("No prediction requested this cycle.\n"),
        Some(Ok(result)) => render_prediction(&mut out, result),
        Some(Err(err)) => {
            let _ = writeln!(out, "Prediction unavailable: {err}");
        }
    }
    out.push('\n');

    out.push_str("2. Model validation\n");
    match &report.confusion {
        Ok(ConfusionReport::Precomputed(path)) => {
            let _ = writeln!(
                out,
                "Confusion matrix: precomputed rendering at {} (not recomputed)",
                path.display()
            );
        }
        Ok(ConfusionReport::Computed(metrics)) => {
            let _ = writeln!(
                out,
                "Confusion matrix: computed over a deterministic sample of {} rows",
                metrics.rows_sampled
            );
            if metrics.rows_excluded > 0 {
                let _ = writeln!(
                    out,
                    "({} sampled rows excluded: label outside the fixed set)",
                    metrics.rows_excluded
                );
            }
            render_matrix(&mut out, &metrics.matrix);
            let _ = writeln!(out, "Accuracy: {}", format_f64_6(metrics.accuracy));
            let _ = writeln!(
                out,
                "Macro precision: {}",
                format_f64_6(metrics.macro_precision)
            );
            let _ = writeln!(out, "Macro recall: {}", format_f64_6(metrics.macro_recall));
            for class in &metrics.per_class {
                let _ = writeln!(
                    out,
                    "{}: precision={} recall={} f1={} support={}",
                    class.label,
                    format_f64_6(class.precision),
                    format_f64_6(class.recall),
                    format_f64_6(class.f1),
                    class.support
                );
            }
        }
        Err(err) => {
            let _ = writeln!(out, "Model validation unavailable: {err}");
        }
    }
    out.push('\n');
    match &report.importance {
        Ok(importance) => render_importance(&mut out, importance),
        Err(err) => {
            let _ = writeln!(out, "Feature importance unavailable: {err}");
        }
    }
    out.push('\n');

    out.push_str("3. Dataset patterns\n");
    match &report.patterns {
        Ok(groups) => render_patterns(&mut out, groups),
        Err(err) => {
            let _ = writeln!(out, "Dataset patterns unavailable: {err}");
        }
    }

    out
}

fn render_prediction(out: &mut String, result: &PredictionResult) {
    let _ = writeln!(out, "Predicted impact level: {}", result.label);
    let _ = writeln!(out, "Confidence: {}", format_pct(result.confidence()));
    let ranked = result.ranked();
    let parts: Vec<String> = ranked
        .iter()
        .map(|(label, p)| format!("{}={}", label, format_f64_6(*p)))
        .collect();
    let _ = writeln!(out, "Probabilities: {}", parts.join(", "));
    let _ = writeln!(
        out,
        "Inputs: {}={}, {}={}, {}={}, {}={}, {}={}",
        schema::INDUSTRY,
        result.input.industry,
        schema::REQUIRED_EDUCATION,
        result.input.education,
        schema::MEDIAN_SALARY,
        result.input.salary,
        schema::EXPERIENCE_REQUIRED,
        result.input.experience,
        schema::REMOTE_WORK_RATIO,
        result.input.remote_ratio
    );
}

fn render_matrix(out: &mut String, matrix: &ConfusionMatrix) {
    let labels = ConfusionMatrix::labels();
    let header: Vec<String> = labels
        .iter()
        .map(|l| format!("pred {}", l.as_str()))
        .collect();
    let _ = writeln!(out, "{:<14} {}", "", header.join("  "));
    for truth in labels {
        let cells: Vec<String> = labels
            .iter()
            .map(|&pred| format!("{:>width$}", matrix.count(truth, pred), width = 4 + pred.as_str().len() + 1))
            .collect();
        let _ = writeln!(out, "{:<14} {}", format!("true {}", truth.as_str()), cells.join("  "));
    }
}

fn render_importance(out: &mut String, importance: &FeatureImportance) {
    out.push_str("Feature importance (top 10):\n");
    for (i, entry) in importance.top(10).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<40} {}",
            i + 1,
            entry.name,
            format_f64_6(entry.importance)
        );
    }
    if let Some(first) = importance.entries.first() {
        let _ = writeln!(
            out,
            "Most important feature: {} ({})",
            first.name,
            format_pct(first.importance)
        );
    }
    if let Some(mismatch) = importance.mismatch {
        let _ = writeln!(
            out,
            "Warning: reconstructed {} feature names for {} importance values; names reconciled to the vector.",
            mismatch.reconstructed, mismatch.vector_len
        );
    }
}

fn render_patterns(out: &mut String, groups: &[GroupStatistic]) {
    for group in groups {
        let _ = writeln!(
            out,
            "{:<9} count={:<7} mean salary={:<12} mean experience={:<6} mean remote={}",
            group.label.as_str(),
            group.count,
            format!("{:.1}", group.mean_salary),
            format!("{:.1}", group.mean_experience),
            format!("{:.1}", group.mean_remote_ratio)
        );
    }
    let low = groups.iter().find(|g| g.label == ImpactLevel::Low);
    let high = groups.iter().find(|g| g.label == ImpactLevel::High);
    if let (Some(low), Some(high)) = (low, high) {
        let _ = writeln!(
            out,
            "Salary pattern: {}",
            salary_pattern_statement(low, high)
        );
        let _ = writeln!(
            out,
            "Experience pattern: {}",
            experience_pattern_statement(low, high)
        );
    }
}

fn salary_pattern_statement(low: &GroupStatistic, high: &GroupStatistic) -> &'static str {
    if relative_gap(low.mean_salary, high.mean_salary) < 0.02 {
        "mean salary is near-identical across impact levels; the categorical features carry the signal"
    } else {
        "mean salary differs materially between impact levels"
    }
}

fn experience_pattern_statement(low: &GroupStatistic, high: &GroupStatistic) -> &'static str {
    if relative_gap(low.mean_experience, high.mean_experience) < 0.02 {
        "mean experience is near-identical across impact levels"
    } else {
        "mean experience differs materially between impact levels"
    }
}

fn relative_gap(a: f64, b: f64) -> f64 {
    let scale = (a.abs() + b.abs()) / 2.0;
    if scale == 0.0 {
        return 0.0;
    }
    (a - b).abs() / scale
}
