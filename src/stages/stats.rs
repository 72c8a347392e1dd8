use crate::artifacts::dataset::Dataset;
use crate::schema::ImpactLevel;
use crate::stages::StageError;

/// Per-label aggregate over the numeric features. Recomputed each render,
/// never cached.
#[derive(Debug, Clone)]
pub struct GroupStatistic {
    pub label: ImpactLevel,
    pub count: usize,
    pub mean_salary: f64,
    pub mean_experience: f64,
    pub mean_remote_ratio: f64,
}

/// Partition rows by exact outcome label and average each numeric feature.
/// An empty partition is an error naming the label; a mean over zero rows
/// is undefined and must never be smuggled in as 0 or NaN.
pub fn group_statistics(dataset: &Dataset) -> Result<Vec<GroupStatistic>, StageError> {
    let mut counts = [0usize; 3];
    let mut salary_sums = [0.0f64; 3];
    let mut experience_sums = [0.0f64; 3];
    let mut remote_sums = [0.0f64; 3];

    for row in dataset.rows() {
        let Some(level) = ImpactLevel::parse(&row.impact_label) else {
            continue;
        };
        let i = level.index();
        counts[i] += 1;
        salary_sums[i] += row.salary;
        experience_sums[i] += row.experience;
        remote_sums[i] += row.remote_ratio;
    }

    for level in ImpactLevel::ALL {
        if counts[level.index()] == 0 {
            return Err(StageError::EmptyPartition(level));
        }
    }

    Ok(ImpactLevel::ALL
        .iter()
        .map(|&label| {
            let i = label.index();
            let n = counts[i] as f64;
            GroupStatistic {
                label,
                count: counts[i],
                mean_salary: salary_sums[i] / n,
                mean_experience: experience_sums[i] / n,
                mean_remote_ratio: remote_sums[i] / n,
            }
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/src_inline/stages/stats.rs"]
mod tests;
