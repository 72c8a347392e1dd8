use std::io::BufRead;
use std::path::Path;

use crate::artifacts::{ArtifactError, open_maybe_gz};
use crate::schema;

#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub industry: String,
    pub education: String,
    pub salary: f64,
    pub experience: f64,
    pub remote_ratio: f64,
    pub impact_label: String,
}

/// The reference dataset: typed rows plus the distinct categorical values
/// in first-appearance order (the option lists the widget layer shows).
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<JobRow>,
    industries: Vec<String>,
    educations: Vec<String>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<JobRow>) -> Self {
        let mut industries: Vec<String> = Vec::new();
        let mut educations: Vec<String> = Vec::new();
        for row in &rows {
            if !industries.iter().any(|v| v == &row.industry) {
                industries.push(row.industry.clone());
            }
            if !educations.iter().any(|v| v == &row.education) {
                educations.push(row.education.clone());
            }
        }
        Self {
            rows,
            industries,
            educations,
        }
    }

    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn industries(&self) -> &[String] {
        &self.industries
    }

    pub fn educations(&self) -> &[String] {
        &self.educations
    }

    pub fn distinct_values(&self, feature: &str) -> Option<&[String]> {
        if feature == schema::INDUSTRY {
            Some(&self.industries)
        } else if feature == schema::REQUIRED_EDUCATION {
            Some(&self.educations)
        } else {
            None
        }
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset, ArtifactError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(ArtifactError::load(path, "dataset file is empty"));
    }
    let header = split_csv_line(buf.trim_end_matches(['\r', '\n']));

    let industry_col = find_column(path, &header, schema::INDUSTRY)?;
    let education_col = find_column(path, &header, schema::REQUIRED_EDUCATION)?;
    let salary_col = find_column(path, &header, schema::MEDIAN_SALARY)?;
    let experience_col = find_column(path, &header, schema::EXPERIENCE_REQUIRED)?;
    let remote_col = find_column(path, &header, schema::REMOTE_WORK_RATIO)?;
    let impact_col = find_column(path, &header, schema::AI_IMPACT_LEVEL)?;

    let mut rows = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        rows.push(JobRow {
            industry: field_at(path, &fields, industry_col, line_no)?,
            education: field_at(path, &fields, education_col, line_no)?,
            salary: numeric_at(path, &fields, salary_col, line_no)?,
            experience: numeric_at(path, &fields, experience_col, line_no)?,
            remote_ratio: numeric_at(path, &fields, remote_col, line_no)?,
            impact_label: field_at(path, &fields, impact_col, line_no)?,
        });
    }

    if rows.is_empty() {
        return Err(ArtifactError::load(path, "dataset contains no data rows"));
    }

    let dataset = Dataset::from_rows(rows);
    tracing::info!(
        "loaded dataset: {} rows, {} industries, {} education levels",
        dataset.len(),
        dataset.industries().len(),
        dataset.educations().len()
    );
    Ok(dataset)
}

fn find_column(path: &Path, header: &[String], name: &str) -> Result<usize, ArtifactError> {
    header
        .iter()
        .position(|col| col == name)
        .ok_or_else(|| ArtifactError::load(path, format!("missing required column {name:?}")))
}

fn field_at(
    path: &Path,
    fields: &[String],
    col: usize,
    line_no: usize,
) -> Result<String, ArtifactError> {
    fields.get(col).cloned().ok_or_else(|| {
        ArtifactError::load(path, format!("line {line_no} has too few fields"))
    })
}

fn numeric_at(
    path: &Path,
    fields: &[String],
    col: usize,
    line_no: usize,
) -> Result<f64, ArtifactError> {
    let raw = field_at(path, fields, col, line_no)?;
    raw.trim().parse::<f64>().map_err(|_| {
        ArtifactError::load(
            path,
            format!("line {line_no} has non-numeric value {raw:?}"),
        )
    })
}

/// Minimal RFC 4180 field splitting: quoted fields may contain commas and
/// doubled quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => {
                    fields.push(std::mem::take(&mut field));
                }
                _ => field.push(ch),
            }
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
#[path = "../../tests/src_inline/artifacts/dataset.rs"]
mod tests;
