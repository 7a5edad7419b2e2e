pub mod config;
pub mod dataset;
pub mod dimred;
mod error;
pub mod linear_model;
pub mod pipeline;
pub mod preprocessing;
pub mod statistics;

pub use config::PipelineConfig;
pub use dataset::{Dataset, Feature, Preprocessor};
pub use dimred::{EigenPair, Pca, PcaBuilder};
pub use error::PcaError;
pub use linear_model::LinearRegression;
pub use preprocessing::Standardizer;
