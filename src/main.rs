mod artifacts;
mod classifier;
mod logging;
mod report;
mod sample;
mod schema;
mod stages;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use crate::artifacts::ArtifactStore;
use crate::report::DashboardReport;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::stages::StageError;
use crate::stages::diagnostics::{ConfusionReport, FeatureImportance, assemble_confusion, assemble_importance};
use crate::stages::normalize::{RawSelection, normalize_selection};
use crate::stages::predict::{PredictionResult, predict};
use crate::stages::stats::{GroupStatistic, group_statistics};

/// One invocation is one render cycle: load the two artifacts once, run the
/// requested sections, render everything as text and JSON.
#[derive(Debug, Parser)]
#[command(name = "ai-impact-dash", version, about)]
struct Cli {
    /// Trained model artifact (JSON, optionally .gz).
    #[arg(long, default_value = "ai_impact_model.json")]
    model: PathBuf,

    /// Reference dataset (CSV, optionally .gz).
    #[arg(long, default_value = "ai_job_trends_dataset.csv")]
    data: PathBuf,

    /// Precomputed confusion-matrix image. Defaults to confusion_matrix.png
    /// beside the model artifact; used as-is when present.
    #[arg(long)]
    confusion_image: Option<PathBuf>,

    /// Write report.txt and summary.json here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render the interactive-prediction section.
    #[arg(long)]
    predict: bool,

    /// Industry; defaults to the first value observed in the dataset.
    #[arg(long)]
    industry: Option<String>,

    /// Required education; defaults to the first value observed in the dataset.
    #[arg(long)]
    education: Option<String>,

    /// Median salary in USD.
    #[arg(long, default_value_t = 90_000)]
    salary: i64,

    /// Experience required, in years.
    #[arg(long, default_value_t = 10)]
    experience: i64,

    /// Remote work ratio, in percent.
    #[arg(long, default_value_t = 50)]
    remote: i64,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let store = ArtifactStore::new(cli.model.clone(), cli.data.clone());
    let confusion_image = resolve_confusion_image(cli);

    let prediction = if cli.predict {
        Some(run_prediction(&store, cli))
    } else {
        None
    };
    let confusion = run_confusion(&store, &confusion_image);
    let importance = run_importance(&store);
    let patterns = run_patterns(&store);

    let report = DashboardReport {
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        model_path: cli.model.display().to_string(),
        dataset_path: cli.data.display().to_string(),
        dataset_rows: store.dataset().ok().map(|d| d.len()),
        prediction,
        confusion,
        importance,
        patterns,
    };

    match &cli.out {
        Some(out_dir) => write_reports(&report, out_dir),
        None => {
            print!("{}", render_report_text(&report));
            Ok(())
        }
    }
}

fn resolve_confusion_image(cli: &Cli) -> PathBuf {
    match &cli.confusion_image {
        Some(path) => path.clone(),
        None => {
            let dir = cli.model.parent().unwrap_or_else(|| Path::new("."));
            dir.join("confusion_matrix.png")
        }
    }
}

fn run_prediction(store: &ArtifactStore, cli: &Cli) -> Result<PredictionResult, StageError> {
    let model = store.model()?;
    let dataset = store.dataset()?;
    let raw = RawSelection {
        industry: cli
            .industry
            .clone()
            .or_else(|| dataset.industries().first().cloned())
            .unwrap_or_default(),
        education: cli
            .education
            .clone()
            .or_else(|| dataset.educations().first().cloned())
            .unwrap_or_default(),
        salary: cli.salary,
        experience: cli.experience,
        remote_ratio: cli.remote,
    };
    let input = normalize_selection(&dataset, &raw)?;
    predict(&model, &input)
}

fn run_confusion(
    store: &ArtifactStore,
    confusion_image: &Path,
) -> Result<ConfusionReport, StageError> {
    let model = store.model()?;
    let dataset = store.dataset()?;
    assemble_confusion(&model, &dataset, Some(confusion_image))
}

fn run_importance(store: &ArtifactStore) -> Result<FeatureImportance, StageError> {
    let model = store.model()?;
    let dataset = store.dataset()?;
    Ok(assemble_importance(&model, &dataset))
}

fn run_patterns(store: &ArtifactStore) -> Result<Vec<GroupStatistic>, StageError> {
    let dataset = store.dataset()?;
    group_statistics(&dataset)
}

fn write_reports(report: &DashboardReport, out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| e.to_string())?;

    let text = render_report_text(report);
    fs::write(out_dir.join("report.txt"), text).map_err(|e| e.to_string())?;

    let json = render_summary_json(report).map_err(|e| e.to_string())?;
    fs::write(out_dir.join("summary.json"), json).map_err(|e| e.to_string())?;

    Ok(())
}
