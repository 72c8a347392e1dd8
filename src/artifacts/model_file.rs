use std::path::Path;

use serde::Deserialize;

use crate::artifacts::{ArtifactError, open_maybe_gz};
use crate::classifier::ModelHandle;
use crate::classifier::expansion::FeatureExpansionSpec;
use crate::classifier::forest::Forest;
use crate::schema::ImpactLevel;

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// On-disk form of the model artifact: a versioned JSON document written at
/// training time, optionally gzip-compressed.
#[derive(Debug, Deserialize)]
struct ModelFile {
    format_version: u32,
    classes: Vec<String>,
    expansion: FeatureExpansionSpec,
    forest: Forest,
    feature_importances: Vec<f64>,
}

pub fn load_model(path: &Path) -> Result<ModelHandle, ArtifactError> {
    let reader = open_maybe_gz(path)?;
    let file: ModelFile = serde_json::from_reader(reader)
        .map_err(|e| ArtifactError::load(path, e.to_string()))?;

    if file.format_version != MODEL_FORMAT_VERSION {
        return Err(ArtifactError::load(
            path,
            format!(
                "unsupported model format version {} (expected {MODEL_FORMAT_VERSION})",
                file.format_version
            ),
        ));
    }

    let mut classes = Vec::with_capacity(file.classes.len());
    for name in &file.classes {
        match ImpactLevel::parse(name) {
            Some(level) => classes.push(level),
            None => {
                return Err(ArtifactError::load(
                    path,
                    format!("unknown class label {name:?}"),
                ));
            }
        }
    }

    let model = ModelHandle::new(
        classes,
        file.expansion,
        file.forest,
        file.feature_importances,
    )
    .map_err(|reason| ArtifactError::load(path, reason))?;

    tracing::info!(
        "loaded model: {} trees, {} expanded columns, classes {:?}",
        model.forest.trees.len(),
        model.expansion.width(),
        model.classes
    );
    Ok(model)
}
