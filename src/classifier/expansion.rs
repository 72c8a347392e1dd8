use serde::{Deserialize, Serialize};

use crate::schema::{self, PredictionInput};

pub const EXPANSION_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalExpansion {
    pub feature: String,
    pub values: Vec<String>,
}

/// The training pipeline's column expansion, serialized with the model so
/// feature names never have to be re-derived by introspection at runtime.
/// Columns are the numeric features in schema order followed by one
/// indicator column per categorical value, in the order listed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExpansionSpec {
    pub version: u32,
    pub categorical: Vec<CategoricalExpansion>,
}

impl FeatureExpansionSpec {
    pub fn validate(&self) -> Result<(), String> {
        if self.version != EXPANSION_VERSION {
            return Err(format!(
                "unsupported expansion spec version {} (expected {EXPANSION_VERSION})",
                self.version
            ));
        }
        if self.categorical.len() != schema::CATEGORICAL_FEATURES.len() {
            return Err(format!(
                "expansion spec covers {} categorical features, expected {}",
                self.categorical.len(),
                schema::CATEGORICAL_FEATURES.len()
            ));
        }
        for (block, expected) in self.categorical.iter().zip(schema::CATEGORICAL_FEATURES) {
            if block.feature != expected {
                return Err(format!(
                    "expansion spec lists feature {:?} where {:?} was expected",
                    block.feature, expected
                ));
            }
            if block.values.is_empty() {
                return Err(format!("feature {:?} has no category values", block.feature));
            }
            for (i, value) in block.values.iter().enumerate() {
                if block.values[..i].contains(value) {
                    return Err(format!(
                        "feature {:?} lists duplicate category value {:?}",
                        block.feature, value
                    ));
                }
            }
        }
        Ok(())
    }

    /// Total expanded column count.
    pub fn width(&self) -> usize {
        schema::NUMERIC_FEATURES.len()
            + self
                .categorical
                .iter()
                .map(|block| block.values.len())
                .sum::<usize>()
    }

    /// Expand a record into the model's input vector. A category value the
    /// training pipeline never saw cannot be encoded and is an error here.
    pub fn expand(&self, input: &PredictionInput) -> Result<Vec<f64>, String> {
        let mut out = Vec::with_capacity(self.width());
        out.push(input.salary);
        out.push(input.experience);
        out.push(input.remote_ratio);
        for block in &self.categorical {
            let value = if block.feature == schema::INDUSTRY {
                &input.industry
            } else if block.feature == schema::REQUIRED_EDUCATION {
                &input.education
            } else {
                return Err(format!("unknown categorical feature {:?}", block.feature));
            };
            match block.values.iter().position(|v| v == value) {
                Some(pos) => {
                    for i in 0..block.values.len() {
                        out.push(if i == pos { 1.0 } else { 0.0 });
                    }
                }
                None => {
                    return Err(format!(
                        "{} value {:?} was not seen at training time",
                        block.feature, value
                    ));
                }
            }
        }
        Ok(out)
    }

    /// Human-readable column names: numeric features keep their schema
    /// name, categorical values become "{feature}: {value}".
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = schema::NUMERIC_FEATURES
            .iter()
            .map(|name| name.to_string())
            .collect();
        for block in &self.categorical {
            for value in &block.values {
                names.push(format!("{}: {}", block.feature, value));
            }
        }
        names
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/classifier/expansion.rs"]
mod tests;
