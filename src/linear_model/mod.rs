//! Ordinary least-squares regression.

mod metrics;

pub use metrics::{mean_squared_error, r2_score};

use crate::error::PcaError;
use log::debug;
use nalgebra::DVector;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use nshare::IntoNalgebra;

/// Least-squares linear model `y ≈ X·w + b`.
///
/// Fitting centers `X` and `y` (when an intercept is fitted) and solves the centered
/// system through an SVD, which gives the minimum-norm solution for rank-deficient
/// designs instead of failing on a singular `XᵀX`.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            coefficients: None,
            intercept: None,
        }
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<&mut Self> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(PcaError::EmptyDataset.into());
        }
        if y.len() != n_samples {
            return Err(PcaError::DimensionMismatch {
                expected: n_samples,
                actual: y.len(),
            }
            .into());
        }
        if n_features == 0 {
            anyhow::bail!("design matrix has no feature columns");
        }
        if let Some(((row, col), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PcaError::NonFinite { row, col }.into());
        }
        if let Some(row) = y.iter().position(|v| !v.is_finite()) {
            return Err(PcaError::NonFinite { row, col: 0 }.into());
        }

        let (x_offset, y_offset) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| anyhow::Error::from(PcaError::EmptyDataset))?;
            (x_mean, y.sum() / n_samples as f64)
        } else {
            (Array1::zeros(n_features), 0.0)
        };

        let design = (&x - &x_offset).into_nalgebra();
        let target = DVector::from_iterator(n_samples, y.iter().map(|v| v - y_offset));

        let svd = design.svd(true, true);
        let s_max = svd.singular_values.max();
        let eps = f64::EPSILON * n_samples.max(n_features) as f64 * s_max;
        let solution = svd
            .solve(&target, eps)
            .map_err(|e| PcaError::Decomposition(e.to_string()))?;

        let coefficients = Array1::from_iter(solution.iter().copied());
        let intercept = y_offset - x_offset.dot(&coefficients);
        debug!("fitted coefficients {:?}, intercept {}", coefficients, intercept);

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        Ok(self)
    }

    fn fitted(&self) -> anyhow::Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.intercept) {
            (Some(w), Some(b)) => Ok((w, b)),
            _ => Err(PcaError::NotFitted("LinearRegression").into()),
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let (w, b) = self.fitted()?;
        if x.ncols() != w.len() {
            return Err(PcaError::DimensionMismatch {
                expected: w.len(),
                actual: x.ncols(),
            }
            .into());
        }
        Ok(x.dot(w) + b)
    }

    /// R² of the predictions for `x` against `y`.
    pub fn score(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<f64> {
        let predictions = self.predict(x)?;
        r2_score(y, predictions.view())
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_recovers_exact_linear_relation() {
        let x = array![
            [1.0, 2.0],
            [2.0, 0.5],
            [3.0, 1.0],
            [4.0, 3.0],
            [5.0, -1.0]
        ];
        let y = x.map_axis(Axis(1), |row| 1.5 + 2.0 * row[0] - 3.0 * row[1]);

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        let w = model.coefficients().unwrap();
        assert_abs_diff_eq!(w[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(w[1], -3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.intercept().unwrap(), 1.5, epsilon = 1e-10);
        assert_abs_diff_eq!(model.score(x.view(), y.view()).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_least_squares_line() {
        // closed form: slope Sxy/Sxx = 19.6/10, intercept 4.16 - 1.96 * 2
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![0.1, 2.4, 4.2, 6.0, 8.1];

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        assert_abs_diff_eq!(model.coefficients().unwrap()[0], 1.96, epsilon = 1e-10);
        assert_abs_diff_eq!(model.intercept().unwrap(), 0.24, epsilon = 1e-10);
        let r2 = model.score(x.view(), y.view()).unwrap();
        assert!(r2 > 0.99 && r2 < 1.0);
    }

    #[test]
    fn test_without_intercept() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new().fit_intercept(false);
        model.fit(x.view(), y.view()).unwrap();

        assert_abs_diff_eq!(model.coefficients().unwrap()[0], 2.0, epsilon = 1e-12);
        assert_eq!(model.intercept(), Some(0.0));
    }

    #[test]
    fn test_collinear_design_still_fits() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut model = LinearRegression::new();
        model.fit(x.view(), y.view()).unwrap();

        let predictions = model.predict(x.view()).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert_abs_diff_eq!(p, t, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_predict_before_fit_and_shape_errors() {
        let model = LinearRegression::new();
        let x = Array2::<f64>::zeros((2, 2));
        let err = model.predict(x.view()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PcaError>(),
            Some(&PcaError::NotFitted("LinearRegression"))
        );

        let mut model = LinearRegression::new();
        let err = model.fit(x.view(), array![1.0].view()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PcaError>(),
            Some(PcaError::DimensionMismatch { .. })
        ));

        let bad = array![[1.0, f64::INFINITY], [0.0, 1.0]];
        let err = model.fit(bad.view(), array![1.0, 2.0].view()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PcaError>(),
            Some(&PcaError::NonFinite { row: 0, col: 1 })
        );
    }
}
