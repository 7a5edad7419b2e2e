use crate::dataset::{EmptyColumnPolicy, Feature};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one pipeline run. Every field has a default, so a TOML file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Feature columns fed to the standardizer, in order.
    pub features: Vec<Feature>,
    /// Number of principal components kept for the reduced regression.
    pub n_components: usize,
    /// Clamp `n_components` to the feature count (with a warning) instead of failing.
    pub clamp_components: bool,
    pub test_fraction: f64,
    pub seed: u64,
    pub standardizer_ddof: usize,
    pub covariance_ddof: usize,
    pub canonical_signs: bool,
    /// Value used for columns with no usable entries. Unset means such columns are an error.
    pub empty_column_fill: Option<f64>,
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
            n_components: 3,
            clamp_components: false,
            test_fraction: 0.2,
            seed: 42,
            standardizer_ddof: 0,
            covariance_ddof: 1,
            canonical_signs: true,
            empty_column_fill: None,
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("invalid pipeline configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.features.is_empty(), "at least one feature must be selected");
        for (i, feature) in self.features.iter().enumerate() {
            ensure!(
                !self.features[..i].contains(feature),
                "feature '{}' listed multiple times",
                feature
            );
        }
        ensure!(self.n_components > 0, "n_components must be at least 1");
        ensure!(
            self.test_fraction > 0.0 && self.test_fraction < 1.0,
            "test_fraction must be in (0, 1), got {}",
            self.test_fraction
        );
        ensure!(
            self.delimiter.is_ascii(),
            "delimiter must be a single ASCII character"
        );
        if let Some(fill) = self.empty_column_fill {
            ensure!(fill.is_finite(), "empty_column_fill must be finite");
        }
        Ok(())
    }

    pub fn empty_column_policy(&self) -> EmptyColumnPolicy {
        match self.empty_column_fill {
            Some(value) => EmptyColumnPolicy::Fill(value),
            None => EmptyColumnPolicy::Fail,
        }
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
