//! # Principal Component Analysis
//!
//! Covariance-based PCA over standardized dense data. Fitting computes the feature
//! covariance matrix, decomposes it with [`crate::dimred::eigen::symmetric_eigen`] and keeps
//! the top-k eigenvectors as the columns of the projection matrix `W`
//! (`n_features x k`). The same `W` is then reused to project any number of tables.
//!
//! Input is expected to be standardized already (see [`crate::preprocessing::Standardizer`]);
//! the projector itself does not center or scale.

use crate::dimred::eigen::{self, EigenPair};
use crate::error::PcaError;
use crate::statistics;
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView2};

/// Tolerance below which negative covariance eigenvalues are treated as roundoff.
const NEGATIVE_EIGENVALUE_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct PcaBuilder {
    n_components: Option<usize>,
    clamp_components: bool,
    canonical_signs: bool,
    ddof: usize,
}

impl Default for PcaBuilder {
    fn default() -> Self {
        Self {
            n_components: None,
            clamp_components: false,
            canonical_signs: true,
            ddof: 1,
        }
    }
}

impl PcaBuilder {
    /// Defaults: all components, no clamping, canonical signs, sample covariance (`ddof = 1`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    /// When set, a component count above the feature count is clamped (with a warning)
    /// instead of rejected.
    pub fn clamp_components(mut self, clamp: bool) -> Self {
        self.clamp_components = clamp;
        self
    }

    pub fn canonical_signs(mut self, canonical: bool) -> Self {
        self.canonical_signs = canonical;
        self
    }

    pub fn ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }

    pub fn build(self) -> Pca {
        Pca {
            n_components: self.n_components,
            clamp_components: self.clamp_components,
            canonical_signs: self.canonical_signs,
            ddof: self.ddof,
            components: None,
            eigenpairs: None,
            total_variance: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pca {
    n_components: Option<usize>,
    clamp_components: bool,
    canonical_signs: bool,
    ddof: usize,
    components: Option<Array2<f64>>,
    eigenpairs: Option<Vec<EigenPair>>,
    total_variance: Option<f64>,
}

impl Pca {
    fn resolve_components(&self, n_features: usize) -> anyhow::Result<usize> {
        let requested = self.n_components.unwrap_or(n_features);
        if requested == 0 {
            return Err(PcaError::InvalidComponentCount {
                requested,
                available: n_features,
            }
            .into());
        }
        if requested > n_features {
            if !self.clamp_components {
                return Err(PcaError::InvalidComponentCount {
                    requested,
                    available: n_features,
                }
                .into());
            }
            warn!(
                "requested {} components, clamping to the {} available features",
                requested, n_features
            );
            return Ok(n_features);
        }
        Ok(requested)
    }

    /// Fits the projection on standardized training data (samples x features).
    pub fn fit(&mut self, x: ArrayView2<f64>) -> anyhow::Result<&mut Self> {
        let n_features = x.ncols();
        let k = self.resolve_components(n_features)?;

        let cov = statistics::covariance_matrix(x, self.ddof)?;
        debug!("covariance matrix:\n{:.4}", cov);

        let mut pairs = eigen::symmetric_eigen(cov.view())?;
        for pair in pairs.iter_mut() {
            if pair.value < 0.0 {
                if pair.value < -NEGATIVE_EIGENVALUE_TOLERANCE {
                    warn!(
                        "covariance eigenvalue {:e} is negative beyond roundoff, clamping to 0",
                        pair.value
                    );
                }
                pair.value = 0.0;
            }
            if self.canonical_signs {
                eigen::canonicalize_sign(&mut pair.vector);
            }
        }

        let total_variance: f64 = pairs.iter().map(|p| p.value).sum();
        let components = eigen::eigenvector_matrix(&pairs[..k]);
        debug!(
            "eigenvalues: {:?}",
            pairs.iter().map(|p| p.value).collect::<Vec<_>>()
        );

        self.components = Some(components);
        self.eigenpairs = Some(pairs);
        self.total_variance = Some(total_variance);
        Ok(self)
    }

    fn fitted_components(&self) -> anyhow::Result<&Array2<f64>> {
        self.components
            .as_ref()
            .ok_or_else(|| anyhow::Error::from(PcaError::NotFitted("PCA")))
    }

    /// Projects rows onto the retained components: `x · W`.
    pub fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let components = self.fitted_components()?;
        if x.ncols() != components.nrows() {
            return Err(PcaError::DimensionMismatch {
                expected: components.nrows(),
                actual: x.ncols(),
            }
            .into());
        }
        Ok(x.dot(components))
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Maps projected coordinates back to feature space: `z · Wᵀ`.
    /// Exact when all components are retained.
    pub fn inverse_transform(&self, z: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let components = self.fitted_components()?;
        if z.ncols() != components.ncols() {
            return Err(PcaError::DimensionMismatch {
                expected: components.ncols(),
                actual: z.ncols(),
            }
            .into());
        }
        Ok(z.dot(&components.t()))
    }

    /// Projection matrix, one eigenvector per column.
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    pub fn n_components(&self) -> Option<usize> {
        self.components.as_ref().map(|c| c.ncols())
    }

    /// Every eigenpair of the training covariance, descending.
    pub fn eigenpairs(&self) -> Option<&[EigenPair]> {
        self.eigenpairs.as_deref()
    }

    pub fn all_eigenvalues(&self) -> Option<Array1<f64>> {
        self.eigenpairs
            .as_ref()
            .map(|pairs| pairs.iter().map(|p| p.value).collect())
    }

    /// Eigenvalues of the retained components.
    pub fn eigenvalues(&self) -> Option<Array1<f64>> {
        let k = self.n_components()?;
        self.all_eigenvalues().map(|ev| ev.slice(s![..k]).to_owned())
    }

    pub fn total_variance(&self) -> Option<f64> {
        self.total_variance
    }

    /// Share of the total variance carried by each retained component.
    pub fn explained_variance_ratio(&self) -> anyhow::Result<Array1<f64>> {
        let eigenvalues = self
            .eigenvalues()
            .ok_or_else(|| anyhow::Error::from(PcaError::NotFitted("PCA")))?;
        let total = self.total_variance.unwrap_or(0.0);
        if total <= 0.0 {
            return Ok(Array1::zeros(eigenvalues.len()));
        }
        Ok(eigenvalues / total)
    }

    pub fn cumulative_explained_variance_ratio(&self) -> anyhow::Result<Array1<f64>> {
        let ratios = self.explained_variance_ratio()?;
        let mut cumulative = Array1::zeros(ratios.len());
        let mut sum = 0.0;
        for (i, &ratio) in ratios.iter().enumerate() {
            sum += ratio;
            cumulative[i] = sum;
        }
        Ok(cumulative)
    }

    /// Sum of retained eigenvalues over the sum of all eigenvalues.
    pub fn total_explained_variance_ratio(&self) -> anyhow::Result<f64> {
        Ok(self.explained_variance_ratio()?.sum())
    }

    /// Squared loadings, `n_features x k`. Each column sums to one.
    pub fn feature_importances(&self) -> anyhow::Result<Array2<f64>> {
        Ok(self.fitted_components()?.mapv(|x| x * x))
    }
}
