use std::fmt;

use serde::Serialize;

pub const INDUSTRY: &str = "Industry";
pub const REQUIRED_EDUCATION: &str = "Required Education";
pub const MEDIAN_SALARY: &str = "Median Salary (USD)";
pub const EXPERIENCE_REQUIRED: &str = "Experience Required (Years)";
pub const REMOTE_WORK_RATIO: &str = "Remote Work Ratio (%)";
pub const AI_IMPACT_LEVEL: &str = "AI Impact Level";

/// Feature order the trained pipeline expects. Must never be reordered.
pub const FEATURES: [&str; 5] = [
    INDUSTRY,
    REQUIRED_EDUCATION,
    MEDIAN_SALARY,
    EXPERIENCE_REQUIRED,
    REMOTE_WORK_RATIO,
];

pub const CATEGORICAL_FEATURES: [&str; 2] = [INDUSTRY, REQUIRED_EDUCATION];

/// Numeric features in the order the pipeline's preprocessing emits them
/// (numeric block first, one-hot block second).
pub const NUMERIC_FEATURES: [&str; 3] = [MEDIAN_SALARY, EXPERIENCE_REQUIRED, REMOTE_WORK_RATIO];

#[derive(Debug, Clone, Copy)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumericRange {
    /// Snap to the widget step grid, then clamp into [min, max].
    pub fn quantize(&self, value: f64) -> f64 {
        let snapped = self.min + ((value - self.min) / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }
}

pub const SALARY_RANGE: NumericRange = NumericRange {
    min: 30_000.0,
    max: 150_000.0,
    step: 1_000.0,
};

pub const EXPERIENCE_RANGE: NumericRange = NumericRange {
    min: 0.0,
    max: 40.0,
    step: 1.0,
};

pub const REMOTE_RANGE: NumericRange = NumericRange {
    min: 0.0,
    max: 100.0,
    step: 1.0,
};

/// The fixed outcome label set. Order is the reporting order everywhere
/// (confusion-matrix axes, group statistics, class lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImpactLevel {
    Low,
    Moderate,
    High,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 3] = [ImpactLevel::Low, ImpactLevel::Moderate, ImpactLevel::High];

    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::Low => "Low",
            ImpactLevel::Moderate => "Moderate",
            ImpactLevel::High => "High",
        }
    }

    /// Exact string match only; anything else is outside the label set.
    pub fn parse(value: &str) -> Option<ImpactLevel> {
        match value {
            "Low" => Some(ImpactLevel::Low),
            "Moderate" => Some(ImpactLevel::Moderate),
            "High" => Some(ImpactLevel::High),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ImpactLevel::Low => 0,
            ImpactLevel::Moderate => 1,
            ImpactLevel::High => 2,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record in the model's expected field order and types. Built by the
/// input normalizer, consumed by the prediction stage, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub industry: String,
    pub education: String,
    pub salary: f64,
    pub experience: f64,
    pub remote_ratio: f64,
}

#[cfg(test)]
#[path = "../tests/src_inline/schema.rs"]
mod tests;
