use crate::schema::ImpactLevel;

pub mod expansion;
pub mod forest;

use expansion::FeatureExpansionSpec;
use forest::Forest;

/// The loaded model artifact: ordered class list, column expansion spec,
/// tree ensemble, and the raw importance vector over expanded columns.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub classes: Vec<ImpactLevel>,
    pub expansion: FeatureExpansionSpec,
    pub forest: Forest,
    pub feature_importances: Vec<f64>,
}

impl ModelHandle {
    pub fn new(
        classes: Vec<ImpactLevel>,
        expansion: FeatureExpansionSpec,
        forest: Forest,
        feature_importances: Vec<f64>,
    ) -> Result<Self, String> {
        if classes.len() != ImpactLevel::ALL.len() {
            return Err(format!(
                "class list has {} entries, expected {}",
                classes.len(),
                ImpactLevel::ALL.len()
            ));
        }
        for level in ImpactLevel::ALL {
            if !classes.contains(&level) {
                return Err(format!("class list is missing {level}"));
            }
        }
        expansion.validate()?;
        forest.validate(expansion.width(), classes.len())?;
        for (i, &v) in feature_importances.iter().enumerate() {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("feature importance {i} is negative or not finite"));
            }
        }
        Ok(Self {
            classes,
            expansion,
            forest,
            feature_importances,
        })
    }

    /// Probability interface over an expanded record.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        self.forest.mean_distribution(x)
    }

    /// Label interface over an expanded record.
    pub fn predict(&self, x: &[f64]) -> ImpactLevel {
        self.classes[self.forest.majority_vote(x)]
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/classifier/tests.rs"]
mod tests;
