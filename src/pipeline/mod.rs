//! End-to-end run: standardize, fit a baseline regression, derive principal components,
//! validate them, and refit the regression on the projected features.

use crate::config::PipelineConfig;
use crate::dataset::{self, Dataset, Preprocessor};
use crate::dimred::eigen;
use crate::dimred::{Pca, PcaBuilder};
use crate::linear_model::{mean_squared_error, LinearRegression};
use crate::preprocessing::Standardizer;
use crate::statistics;
use log::info;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::Serialize;
use std::fmt;

/// Tolerance for the eigenpair checks run after fitting the projector.
pub const VALIDATION_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionSummary {
    pub labels: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub train_r2: f64,
    pub test_r2: f64,
    pub test_mse: f64,
}

/// Eigenpair checks on the training covariance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EigenValidation {
    /// max `‖M·v − λ·v‖` over all pairs
    pub max_residual: f64,
    /// max `|‖v‖ − 1|` over all pairs
    pub max_norm_error: f64,
    /// max `|VᵀV − I|`
    pub orthonormality_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub eigenvalues: Vec<f64>,
    pub n_components: usize,
    pub explained_variance_ratio: Vec<f64>,
    pub cumulative_explained_variance_ratio: Vec<f64>,
    pub validation: EigenValidation,
    pub baseline: RegressionSummary,
    pub reduced: RegressionSummary,
}

/// Fitted objects and projected matrices, kept for callers that want to export or
/// inspect them.
pub struct PipelineOutput {
    pub report: PipelineReport,
    pub standardizer: Standardizer,
    pub pca: Pca,
    pub train: Dataset,
    pub test: Dataset,
    pub projected_train: Array2<f64>,
    pub projected_test: Array2<f64>,
}

fn fit_regression(
    labels: Vec<String>,
    x_train: ArrayView2<f64>,
    y_train: ArrayView1<f64>,
    x_test: ArrayView2<f64>,
    y_test: ArrayView1<f64>,
) -> anyhow::Result<RegressionSummary> {
    let mut model = LinearRegression::new();
    model.fit(x_train, y_train)?;

    let train_r2 = model.score(x_train, y_train)?;
    let predictions = model.predict(x_test)?;
    let test_r2 = crate::linear_model::r2_score(y_test, predictions.view())?;
    let test_mse = mean_squared_error(y_test, predictions.view())?;

    Ok(RegressionSummary {
        labels,
        coefficients: model.coefficients().map(|w| w.to_vec()).unwrap_or_default(),
        intercept: model.intercept().unwrap_or_default(),
        train_r2,
        test_r2,
        test_mse,
    })
}

fn validate_eigenpairs(
    pca: &Pca,
    x_train: ArrayView2<f64>,
    ddof: usize,
) -> anyhow::Result<EigenValidation> {
    let pairs = pca
        .eigenpairs()
        .ok_or_else(|| anyhow::anyhow!("PCA has no eigenpairs after fitting"))?;
    let cov = statistics::covariance_matrix(x_train, ddof)?;

    let max_residual = pairs
        .iter()
        .map(|p| p.residual(cov.view()))
        .fold(0.0, f64::max);
    let max_norm_error = pairs
        .iter()
        .map(|p| (p.norm() - 1.0).abs())
        .fold(0.0, f64::max);
    let vectors = eigen::eigenvector_matrix(pairs);
    let orthonormality_error = eigen::check_orthonormal(vectors.view(), VALIDATION_TOLERANCE)?;

    anyhow::ensure!(
        max_norm_error <= VALIDATION_TOLERANCE,
        "eigenvector norm deviates from 1 by {:e}",
        max_norm_error
    );
    let scale = pairs.first().map_or(1.0, |p| p.value.abs().max(1.0));
    anyhow::ensure!(
        max_residual <= VALIDATION_TOLERANCE * scale,
        "eigen equation residual {:e} exceeds tolerance",
        max_residual
    );

    Ok(EigenValidation {
        max_residual,
        max_norm_error,
        orthonormality_error,
    })
}

/// Runs the full pipeline on an already preprocessed dataset.
pub fn run(config: &PipelineConfig, data: &Dataset) -> anyhow::Result<PipelineOutput> {
    config.validate()?;
    let (train, test) = dataset::train_test_split(data, config.test_fraction, config.seed)?;

    let mut standardizer = Standardizer::new().ddof(config.standardizer_ddof);
    let x_train = standardizer.fit_transform(train.features.view())?;
    let x_test = standardizer.transform(test.features.view())?;
    info!("standardized {} features", x_train.ncols());

    let baseline = fit_regression(
        train.feature_names.clone(),
        x_train.view(),
        train.target.view(),
        x_test.view(),
        test.target.view(),
    )?;
    info!(
        "baseline regression: train R² {:.4}, test R² {:.4}",
        baseline.train_r2, baseline.test_r2
    );

    let mut pca = PcaBuilder::new()
        .n_components(config.n_components)
        .clamp_components(config.clamp_components)
        .canonical_signs(config.canonical_signs)
        .ddof(config.covariance_ddof)
        .build();
    let projected_train = pca.fit_transform(x_train.view())?;
    let projected_test = pca.transform(x_test.view())?;

    let validation = validate_eigenpairs(&pca, x_train.view(), config.covariance_ddof)?;
    let ratios = pca.explained_variance_ratio()?;
    let n_components = projected_train.ncols();
    info!(
        "kept {} components explaining {:.2}% of variance",
        n_components,
        ratios.sum() * 100.0
    );

    let component_labels = (1..=n_components).map(|i| format!("pc{}", i)).collect();
    let reduced = fit_regression(
        component_labels,
        projected_train.view(),
        train.target.view(),
        projected_test.view(),
        test.target.view(),
    )?;
    info!(
        "reduced regression: train R² {:.4}, test R² {:.4}",
        reduced.train_r2, reduced.test_r2
    );

    let report = PipelineReport {
        n_train: train.n_samples(),
        n_test: test.n_samples(),
        feature_names: train.feature_names.clone(),
        target_name: train.target_name.clone(),
        eigenvalues: pca.all_eigenvalues().map(|e| e.to_vec()).unwrap_or_default(),
        n_components,
        explained_variance_ratio: ratios.to_vec(),
        cumulative_explained_variance_ratio: pca.cumulative_explained_variance_ratio()?.to_vec(),
        validation,
        baseline,
        reduced,
    };

    Ok(PipelineOutput {
        report,
        standardizer,
        pca,
        train,
        test,
        projected_train,
        projected_test,
    })
}

/// Applies imputation per `config` to raw records, then runs the pipeline.
pub fn run_records(
    config: &PipelineConfig,
    records: &[dataset::CarRecord],
) -> anyhow::Result<PipelineOutput> {
    let data = Preprocessor::new(config.features.clone())
        .empty_column(config.empty_column_policy())
        .process(records)?;
    run(config, &data)
}

impl fmt::Display for RegressionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {:<14} {:>12.5}", "intercept", self.intercept)?;
        for (label, w) in self.labels.iter().zip(&self.coefficients) {
            writeln!(f, "  {:<14} {:>12.5}", label, w)?;
        }
        writeln!(f, "  train R²       {:>12.5}", self.train_r2)?;
        writeln!(f, "  test R²        {:>12.5}", self.test_r2)?;
        write!(f, "  test MSE       {:>12.5}", self.test_mse)
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rows: {} train / {} test, target '{}'",
            self.n_train, self.n_test, self.target_name
        )?;
        writeln!(f, "features: {}", self.feature_names.join(", "))?;
        writeln!(f)?;
        writeln!(f, "eigenvalues of the training covariance:")?;
        for (i, value) in self.eigenvalues.iter().enumerate() {
            let kept = i < self.n_components;
            write!(f, "  pc{:<3} {:>10.5}", i + 1, value)?;
            if kept {
                write!(
                    f,
                    "  {:>7.2}%  (cumulative {:>7.2}%)",
                    self.explained_variance_ratio[i] * 100.0,
                    self.cumulative_explained_variance_ratio[i] * 100.0
                )?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "eigenpair checks: residual {:.2e}, norm {:.2e}, orthonormality {:.2e}",
            self.validation.max_residual,
            self.validation.max_norm_error,
            self.validation.orthonormality_error
        )?;
        writeln!(f)?;
        writeln!(f, "regression on standardized features:")?;
        writeln!(f, "{}", self.baseline)?;
        writeln!(f)?;
        writeln!(f, "regression on {} principal components:", self.n_components)?;
        write!(f, "{}", self.reduced)
    }
}
