//! # Dimensionality Reduction
//!
//! Linear dimensionality reduction built from first principles: a covariance matrix,
//! its symmetric eigendecomposition, and a projection onto the leading eigenvectors.
//!
//! - [`eigen`]: validated symmetric eigendecomposition, ordering, sign canonicalization
//!   and orthonormality checks
//! - [`pca`]: the fitted projector ([`pca::Pca`]) with explained-variance reporting
//!
//! Both operate on dense `ndarray` matrices laid out samples x features.

pub mod eigen;
pub mod pca;

pub use eigen::EigenPair;
pub use pca::{Pca, PcaBuilder};
