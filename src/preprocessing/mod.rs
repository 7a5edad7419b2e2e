//! Feature scaling.

use crate::error::PcaError;
use crate::statistics;
use log::warn;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

/// Rescales each column to zero mean and unit variance.
///
/// Parameters are learned once by [`Standardizer::fit`] and then reused unchanged by
/// [`Standardizer::transform`], so held-out rows are scaled with training statistics only.
/// Columns whose standard deviation is numerically zero are treated as already centered
/// and transform to `0.0`.
#[derive(Debug, Clone, Default)]
pub struct Standardizer {
    ddof: usize,
    mean: Option<Array1<f64>>,
    std_dev: Option<Array1<f64>>,
}

fn is_degenerate(mean: f64, std_dev: f64) -> bool {
    std_dev <= f64::EPSILON * mean.abs().max(1.0)
}

impl Standardizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta degrees of freedom for the standard deviation. Defaults to 0 (population).
    pub fn ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }

    pub fn fit(&mut self, x: ArrayView2<f64>) -> anyhow::Result<&mut Self> {
        let mean = statistics::column_means(x)?;
        let std_dev = statistics::column_std(x, self.ddof)?;

        for (j, (&m, &s)) in mean.iter().zip(std_dev.iter()).enumerate() {
            if is_degenerate(m, s) {
                warn!("column {} has zero variance, it will be standardized to 0", j);
            }
        }

        self.mean = Some(mean);
        self.std_dev = Some(std_dev);
        Ok(self)
    }

    fn fitted(&self, x: &ArrayView2<f64>) -> anyhow::Result<(&Array1<f64>, &Array1<f64>)> {
        let (mean, std_dev) = match (&self.mean, &self.std_dev) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(PcaError::NotFitted("Standardizer").into()),
        };
        if x.ncols() != mean.len() {
            return Err(PcaError::DimensionMismatch {
                expected: mean.len(),
                actual: x.ncols(),
            }
            .into());
        }
        Ok((mean, std_dev))
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let (mean, std_dev) = self.fitted(&x)?;
        let mut scaled = x.to_owned();

        scaled
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                for ((v, &m), &s) in row.iter_mut().zip(mean.iter()).zip(std_dev.iter()) {
                    *v = if is_degenerate(m, s) { 0.0 } else { (*v - m) / s };
                }
            });

        Ok(scaled)
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Maps standardized values back to the original units. Zero-variance columns
    /// come back as their fitted mean.
    pub fn inverse_transform(&self, z: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let (mean, std_dev) = self.fitted(&z)?;
        let mut restored = z.to_owned();

        restored
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                for ((v, &m), &s) in row.iter_mut().zip(mean.iter()).zip(std_dev.iter()) {
                    *v = if is_degenerate(m, s) { m } else { *v * s + m };
                }
            });

        Ok(restored)
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn std_dev(&self) -> Option<&Array1<f64>> {
        self.std_dev.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }
}
