use crate::artifacts::dataset::{Dataset, JobRow};
use crate::schema::{self, PredictionInput};
use crate::stages::StageError;

/// Raw widget state, exactly as the UI layer hands it over.
#[derive(Debug, Clone)]
pub struct RawSelection {
    pub industry: String,
    pub education: String,
    pub salary: i64,
    pub experience: i64,
    pub remote_ratio: i64,
}

/// Build the single-row model input from raw field values. Categorical
/// values must come from the reference dataset (the widget layer is the
/// only producer, so a miss here means a caller bug upstream); numerics are
/// snapped and clamped to their declared ranges.
pub fn normalize_selection(
    dataset: &Dataset,
    raw: &RawSelection,
) -> Result<PredictionInput, StageError> {
    check_category(dataset, schema::INDUSTRY, &raw.industry)?;
    check_category(dataset, schema::REQUIRED_EDUCATION, &raw.education)?;

    Ok(PredictionInput {
        industry: raw.industry.clone(),
        education: raw.education.clone(),
        salary: schema::SALARY_RANGE.quantize(raw.salary as f64),
        experience: schema::EXPERIENCE_RANGE.quantize(raw.experience as f64),
        remote_ratio: schema::REMOTE_RANGE.quantize(raw.remote_ratio as f64),
    })
}

/// Dataset rows re-enter the model during diagnostics through the same
/// record type the normalizer produces.
pub fn input_from_row(row: &JobRow) -> PredictionInput {
    PredictionInput {
        industry: row.industry.clone(),
        education: row.education.clone(),
        salary: row.salary,
        experience: row.experience,
        remote_ratio: row.remote_ratio,
    }
}

fn check_category(dataset: &Dataset, feature: &str, value: &str) -> Result<(), StageError> {
    let known = dataset
        .distinct_values(feature)
        .ok_or_else(|| StageError::InvalidInput(format!("{feature:?} is not categorical")))?;
    if known.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(StageError::InvalidInput(format!(
            "{feature} value {value:?} does not occur in the reference dataset"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stages/normalize.rs"]
mod tests;
