use super::schema::{CarRecord, Feature, TARGET};
use super::Dataset;
use crate::error::PcaError;
use log::{info, warn};
use ndarray::{Array1, Array2};
use serde::Serialize;

/// What to do with a column that has no usable value at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EmptyColumnPolicy {
    /// Fail with [`PcaError::EmptyColumn`].
    #[default]
    Fail,
    /// Fill every entry with the given value.
    Fill(f64),
}

/// How many entries of a column were imputed, and with which value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationSummary {
    pub column: String,
    pub missing: usize,
    pub fill_value: f64,
}

/// Turns raw records into a fully numeric [`Dataset`].
///
/// Each selected feature column and the target are mean-imputed over their non-missing
/// entries; non-finite values count as missing. `car_name` is dropped.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    features: Vec<Feature>,
    empty_column: EmptyColumnPolicy,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
            empty_column: EmptyColumnPolicy::Fail,
        }
    }
}

impl Preprocessor {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            empty_column: EmptyColumnPolicy::Fail,
        }
    }

    pub fn empty_column(mut self, policy: EmptyColumnPolicy) -> Self {
        self.empty_column = policy;
        self
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn process(&self, records: &[CarRecord]) -> anyhow::Result<Dataset> {
        if records.is_empty() {
            return Err(PcaError::EmptyDataset.into());
        }
        if self.features.is_empty() {
            anyhow::bail!("no feature columns selected");
        }

        let n_samples = records.len();
        let mut features = Array2::zeros((n_samples, self.features.len()));
        let mut imputation = Vec::with_capacity(self.features.len() + 1);

        for (j, feature) in self.features.iter().enumerate() {
            let raw: Vec<Option<f64>> = records.iter().map(|r| feature.value(r)).collect();
            let (column, summary) = impute_column(feature.name(), &raw, self.empty_column)?;
            features.column_mut(j).assign(&column);
            imputation.push(summary);
        }

        let raw_target: Vec<Option<f64>> = records.iter().map(|r| r.mpg).collect();
        let (target, summary) = impute_column(TARGET, &raw_target, self.empty_column)?;
        imputation.push(summary);

        for summary in imputation.iter().filter(|s| s.missing > 0) {
            info!(
                "imputed {} missing '{}' values with {:.4}",
                summary.missing, summary.column, summary.fill_value
            );
        }

        let feature_names = self.features.iter().map(|f| f.name().to_string()).collect();
        let mut dataset = Dataset::new(features, target, feature_names, TARGET.to_string())?;
        dataset.imputation = imputation;
        Ok(dataset)
    }
}

/// Replaces missing entries of one column with the mean of the present ones.
pub fn impute_column(
    name: &str,
    values: &[Option<f64>],
    policy: EmptyColumnPolicy,
) -> anyhow::Result<(Array1<f64>, ImputationSummary)> {
    let present: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect();

    let fill_value = if present.is_empty() {
        match policy {
            EmptyColumnPolicy::Fail => {
                return Err(PcaError::EmptyColumn {
                    column: name.to_string(),
                }
                .into())
            }
            EmptyColumnPolicy::Fill(value) => {
                warn!(
                    "column '{}' has no values, filling with {}",
                    name, value
                );
                value
            }
        }
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    };

    let column: Array1<f64> = values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(fill_value))
        .collect();

    let summary = ImputationSummary {
        column: name.to_string(),
        missing: values.len() - present.len(),
        fill_value,
    };
    Ok((column, summary))
}
