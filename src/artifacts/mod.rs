use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use flate2::read::GzDecoder;
use thiserror::Error;

pub mod dataset;
pub mod model_file;

use dataset::Dataset;
use model_file::load_model;

use crate::classifier::ModelHandle;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("failed to load {}: {}", path.display(), reason)]
    Load { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    pub fn load(path: &Path, reason: impl Into<String>) -> Self {
        ArtifactError::Load {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Process-lifetime store for the two read-only artifacts. Loaded at most
/// once each; every stage borrows the same store instead of reaching for
/// hidden globals. Safe to share across renders: contents are immutable
/// after first load.
#[derive(Debug)]
pub struct ArtifactStore {
    model_path: PathBuf,
    dataset_path: PathBuf,
    model: OnceLock<Arc<ModelHandle>>,
    dataset: OnceLock<Arc<Dataset>>,
}

impl ArtifactStore {
    pub fn new(model_path: PathBuf, dataset_path: PathBuf) -> Self {
        Self {
            model_path,
            dataset_path,
            model: OnceLock::new(),
            dataset: OnceLock::new(),
        }
    }

    /// Idempotent: repeated calls return the identical cached object.
    pub fn model(&self) -> Result<Arc<ModelHandle>, ArtifactError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }
        let loaded = Arc::new(load_model(&self.model_path)?);
        Ok(Arc::clone(self.model.get_or_init(|| loaded)))
    }

    /// Idempotent: repeated calls return the identical cached object.
    pub fn dataset(&self) -> Result<Arc<Dataset>, ArtifactError> {
        if let Some(dataset) = self.dataset.get() {
            return Ok(Arc::clone(dataset));
        }
        let loaded = Arc::new(dataset::load_dataset(&self.dataset_path)?);
        Ok(Arc::clone(self.dataset.get_or_init(|| loaded)))
    }
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::MissingArtifact(path.to_path_buf()));
    }
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/artifacts/tests.rs"]
mod tests;
