//! Tabular input: the fixed car schema, CSV loading, mean imputation and the
//! train/test split.

mod impute;
mod io;
mod schema;

pub use impute::{impute_column, EmptyColumnPolicy, ImputationSummary, Preprocessor};
pub use io::{load_csv, load_from_reader, write_projection, write_projection_csv};
pub use schema::{normalize_header, CarRecord, Feature, TARGET};

use crate::error::PcaError;
use log::info;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A fully numeric design matrix with its regression target.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub imputation: Vec<ImputationSummary>,
}

impl Dataset {
    /// Builds a dataset, checking shapes and that every entry is finite.
    pub fn new(
        features: Array2<f64>,
        target: Array1<f64>,
        feature_names: Vec<String>,
        target_name: String,
    ) -> anyhow::Result<Self> {
        if features.nrows() == 0 {
            return Err(PcaError::EmptyDataset.into());
        }
        if target.len() != features.nrows() {
            return Err(PcaError::DimensionMismatch {
                expected: features.nrows(),
                actual: target.len(),
            }
            .into());
        }
        if feature_names.len() != features.ncols() {
            return Err(PcaError::DimensionMismatch {
                expected: features.ncols(),
                actual: feature_names.len(),
            }
            .into());
        }
        if let Some(((row, col), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PcaError::NonFinite { row, col }.into());
        }
        if let Some(row) = target.iter().position(|v| !v.is_finite()) {
            return Err(PcaError::NonFinite {
                row,
                col: features.ncols(),
            }
            .into());
        }

        Ok(Self {
            features,
            target,
            feature_names,
            target_name,
            imputation: Vec::new(),
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Copy holding only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            target: self.target.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
            imputation: self.imputation.clone(),
        }
    }
}

/// Shuffles rows with a seeded RNG and splits them into `(train, test)`.
///
/// The test partition holds `round(n * test_fraction)` rows; both partitions must end up
/// non-empty. The same seed always yields the same split.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> anyhow::Result<(Dataset, Dataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PcaError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        ))
        .into());
    }

    let n = dataset.n_samples();
    let n_test = (n as f64 * test_fraction).round() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PcaError::InvalidSplit(format!(
            "{} rows with test fraction {} leaves an empty partition",
            n, test_fraction
        ))
        .into());
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    info!(
        "split {} rows into {} train / {} test (seed {})",
        n,
        train_idx.len(),
        test_idx.len(),
        seed
    );
    Ok((dataset.select_rows(train_idx), dataset.select_rows(test_idx)))
}
