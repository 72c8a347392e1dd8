use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::schema::ImpactLevel;

pub mod diagnostics;
pub mod normalize;
pub mod predict;
pub mod stats;

/// Stage outcomes are plain results; the presentation layer decides how
/// each failure is shown and a failure never takes down another section.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "model inconsistency: label interface returned {label} but the probability arg-max is {argmax}"
    )]
    ModelInconsistency {
        label: ImpactLevel,
        argmax: ImpactLevel,
    },
    #[error("empty partition: dataset contains no rows labeled {0}")]
    EmptyPartition(ImpactLevel),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
