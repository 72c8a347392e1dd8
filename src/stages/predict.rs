use crate::classifier::ModelHandle;
use crate::classifier::forest::argmax;
use crate::schema::{ImpactLevel, PredictionInput};
use crate::stages::StageError;

#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub input: PredictionInput,
    pub label: ImpactLevel,
    /// Class order of `probabilities`, as the model declares it.
    pub classes: Vec<ImpactLevel>,
    pub probabilities: Vec<f64>,
}

impl PredictionResult {
    pub fn confidence(&self) -> f64 {
        self.probabilities[argmax(&self.probabilities)]
    }

    /// (label, probability) pairs sorted descending, stable on ties.
    pub fn ranked(&self) -> Vec<(ImpactLevel, f64)> {
        let mut pairs: Vec<(ImpactLevel, f64)> = self
            .classes
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }
}

/// Run both model interfaces on the same record and cross-check them. A
/// disagreement (mismatched model versions are the usual culprit) is
/// surfaced, never silently resolved in favor of either interface.
pub fn predict(model: &ModelHandle, input: &PredictionInput) -> Result<PredictionResult, StageError> {
    let expanded = model
        .expansion
        .expand(input)
        .map_err(StageError::InvalidInput)?;

    let probabilities = model.predict_proba(&expanded);
    let label = model.predict(&expanded);

    let argmax_label = model.classes[argmax(&probabilities)];
    if label != argmax_label {
        return Err(StageError::ModelInconsistency {
            label,
            argmax: argmax_label,
        });
    }

    Ok(PredictionResult {
        input: input.clone(),
        label,
        classes: model.classes.clone(),
        probabilities,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/stages/predict.rs"]
mod tests;
