//! Column statistics over dense sample-by-feature matrices.

use crate::error::PcaError;
use ndarray::{Array1, Array2, ArrayView2, Axis};

fn ensure_rows(x: &ArrayView2<f64>, required: usize) -> anyhow::Result<()> {
    if x.nrows() < required {
        return Err(PcaError::InsufficientRows {
            required,
            actual: x.nrows(),
        }
        .into());
    }
    Ok(())
}

/// Per-column arithmetic mean.
pub fn column_means(x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
    ensure_rows(&x, 1)?;
    x.mean_axis(Axis(0))
        .ok_or_else(|| anyhow::Error::from(PcaError::EmptyDataset))
}

/// Per-column standard deviation with `ddof` delta degrees of freedom
/// (0 for the population estimate, 1 for the sample estimate).
pub fn column_std(x: ArrayView2<f64>, ddof: usize) -> anyhow::Result<Array1<f64>> {
    ensure_rows(&x, ddof + 1)?;
    Ok(x.std_axis(Axis(0), ddof as f64))
}

/// Covariance matrix of the columns of `x`, normalized by `n - ddof`.
///
/// The result is `n_features x n_features` and symmetric by construction: the upper
/// triangle is mirrored onto the lower one so roundoff never breaks symmetry.
pub fn covariance_matrix(x: ArrayView2<f64>, ddof: usize) -> anyhow::Result<Array2<f64>> {
    ensure_rows(&x, ddof + 1)?;
    let mean = column_means(x)?;
    let centered = &x - &mean;
    let denom = (x.nrows() - ddof) as f64;

    let mut cov = centered.t().dot(&centered) / denom;
    let n = cov.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            cov[[j, i]] = cov[[i, j]];
        }
    }
    Ok(cov)
}

/// Total variance, the trace of the covariance matrix.
pub fn total_variance(cov: ArrayView2<f64>) -> f64 {
    cov.diag().sum()
}
