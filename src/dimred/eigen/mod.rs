//! # Symmetric eigendecomposition
//!
//! Validated wrapper around nalgebra's symmetric eigen solver producing [`EigenPair`]s
//! ordered by descending eigenvalue.
//!
//! ## Ordering and ties
//! Pairs are sorted with a stable sort on the eigenvalue, so eigenvalues that compare
//! equal keep the column order reported by the solver. Downstream component ranks and
//! axis assignment follow that order.
//!
//! ## Signs
//! Eigenvectors are only defined up to sign. [`canonicalize_sign`] picks the orientation
//! whose largest-magnitude component is positive, the same convention `svd_flip` applies
//! to singular vectors.

use crate::error::PcaError;
use nalgebra::SymmetricEigen;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use nshare::IntoNalgebra;

/// Relative tolerance used when checking a matrix for symmetry.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// A single eigenvalue together with its unit-norm eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenPair {
    pub value: f64,
    pub vector: Array1<f64>,
}

impl EigenPair {
    /// `‖M·v − λ·v‖₂` for this pair against `matrix`.
    pub fn residual(&self, matrix: ArrayView2<f64>) -> f64 {
        let mv = matrix.dot(&self.vector);
        let lv = &self.vector * self.value;
        (&mv - &lv).mapv(|d| d * d).sum().sqrt()
    }

    pub fn norm(&self) -> f64 {
        self.vector.dot(&self.vector).sqrt()
    }
}

/// Checks that `m` is a non-empty, square, finite and symmetric matrix.
pub fn validate_symmetric(m: ArrayView2<f64>) -> anyhow::Result<()> {
    let (rows, cols) = m.dim();
    if rows != cols || rows == 0 {
        return Err(PcaError::NotSquare { rows, cols }.into());
    }

    let mut scale = 0.0f64;
    for ((row, col), &v) in m.indexed_iter() {
        if !v.is_finite() {
            return Err(PcaError::NonFinite { row, col }.into());
        }
        scale = scale.max(v.abs());
    }

    let tol = SYMMETRY_TOLERANCE * scale.max(1.0);
    for row in 0..rows {
        for col in (row + 1)..cols {
            let difference = (m[[row, col]] - m[[col, row]]).abs();
            if difference > tol {
                return Err(PcaError::NotSymmetric {
                    row,
                    col,
                    difference,
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Eigendecomposition of a real symmetric matrix, pairs sorted by descending eigenvalue.
///
/// The matrix is validated before decomposition; see [`validate_symmetric`].
pub fn symmetric_eigen(m: ArrayView2<f64>) -> anyhow::Result<Vec<EigenPair>> {
    validate_symmetric(m)?;

    let matrix = m.to_owned().into_nalgebra();
    let eigen = SymmetricEigen::new(matrix);

    let mut pairs: Vec<EigenPair> = eigen
        .eigenvalues
        .iter()
        .zip(eigen.eigenvectors.column_iter())
        .map(|(&value, column)| {
            let vector = Array1::from_iter(column.iter().copied());
            let norm = vector.dot(&vector).sqrt();
            EigenPair {
                value,
                vector: vector / norm,
            }
        })
        .collect();

    if pairs
        .iter()
        .any(|p| !p.value.is_finite() || p.vector.iter().any(|v| !v.is_finite()))
    {
        return Err(PcaError::Decomposition("solver produced non-finite eigenpairs".into()).into());
    }

    // stable: ties keep solver order
    pairs.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(pairs)
}

/// Flips `v` in place so its largest-magnitude component is positive.
/// The first index wins when several components share the largest magnitude.
pub fn canonicalize_sign(v: &mut Array1<f64>) {
    let mut pivot = 0.0f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

/// Stacks the pair vectors as the columns of a matrix.
pub fn eigenvector_matrix(pairs: &[EigenPair]) -> Array2<f64> {
    let n = pairs.first().map_or(0, |p| p.vector.len());
    let mut v = Array2::zeros((n, pairs.len()));
    for (mut col, pair) in v.axis_iter_mut(Axis(1)).zip(pairs) {
        col.assign(&pair.vector);
    }
    v
}

/// Rebuilds `V·diag(λ)·Vᵀ` from a full set of pairs.
pub fn reconstruct(pairs: &[EigenPair]) -> Array2<f64> {
    let v = eigenvector_matrix(pairs);
    let lambda = Array1::from_iter(pairs.iter().map(|p| p.value));
    let scaled = &v * &lambda;
    scaled.dot(&v.t())
}

/// Largest absolute deviation of `VᵀV` from the identity, where `V` holds `vectors`
/// as its columns. Zero means the columns are exactly orthonormal.
pub fn orthonormality_error(vectors: ArrayView2<f64>) -> f64 {
    let gram = vectors.t().dot(&vectors);
    gram.indexed_iter()
        .map(|((i, j), &g)| {
            let target = if i == j { 1.0 } else { 0.0 };
            (g - target).abs()
        })
        .fold(0.0, f64::max)
}

/// Fails when the columns of `vectors` deviate from orthonormality by more than `tol`.
pub fn check_orthonormal(vectors: ArrayView2<f64>, tol: f64) -> anyhow::Result<f64> {
    let error = orthonormality_error(vectors);
    if error > tol {
        anyhow::bail!(
            "eigenvectors are not orthonormal: max |VᵀV - I| = {:e} exceeds {:e}",
            error,
            tol
        );
    }
    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_two_by_two_reference_decomposition() {
        let m = array![[5.0, 3.0], [3.0, 5.0]];
        let pairs = symmetric_eigen(m.view()).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_abs_diff_eq!(pairs[0].value, 8.0, epsilon = 1e-10);
        assert_abs_diff_eq!(pairs[1].value, 2.0, epsilon = 1e-10);

        let h = std::f64::consts::FRAC_1_SQRT_2;
        // sign-free comparison against (1,1)/√2 and (1,-1)/√2
        assert_abs_diff_eq!(pairs[0].vector[0].abs(), h, epsilon = 1e-10);
        assert_abs_diff_eq!(pairs[0].vector[1].abs(), h, epsilon = 1e-10);
        assert!(pairs[0].vector[0] * pairs[0].vector[1] > 0.0);
        assert_abs_diff_eq!(pairs[1].vector[0].abs(), h, epsilon = 1e-10);
        assert_abs_diff_eq!(pairs[1].vector[1].abs(), h, epsilon = 1e-10);
        assert!(pairs[1].vector[0] * pairs[1].vector[1] < 0.0);

        let rebuilt = reconstruct(&pairs);
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(rebuilt[[i, j]], m[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_pairs_satisfy_eigen_equation_and_are_orthonormal() {
        let m = array![
            [4.0, 1.0, 0.5, 0.2],
            [1.0, 3.0, 0.3, 0.1],
            [0.5, 0.3, 2.0, 0.4],
            [0.2, 0.1, 0.4, 1.0]
        ];
        let pairs = symmetric_eigen(m.view()).unwrap();

        for pair in &pairs {
            assert_abs_diff_eq!(pair.residual(m.view()), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(pair.norm(), 1.0, epsilon = 1e-12);
        }
        for w in pairs.windows(2) {
            assert!(w[0].value >= w[1].value);
        }
        for i in 0..pairs.len() {
            for j in (i + 1)..pairs.len() {
                assert_abs_diff_eq!(pairs[i].vector.dot(&pairs[j].vector), 0.0, epsilon = 1e-10);
            }
        }

        let v = eigenvector_matrix(&pairs);
        assert!(check_orthonormal(v.view(), 1e-10).is_ok());
    }

    #[test]
    fn test_tied_eigenvalues_still_orthonormal() {
        let m = array![[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let pairs = symmetric_eigen(m.view()).unwrap();

        assert_abs_diff_eq!(pairs[0].value, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pairs[0].vector[2].abs(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pairs[1].value, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pairs[2].value, 2.0, epsilon = 1e-12);
        let v = eigenvector_matrix(&pairs);
        assert!(orthonormality_error(v.view()) < 1e-12);
    }

    #[test]
    fn test_non_symmetric_matrix_is_rejected() {
        let m = array![[1.0, 2.0], [0.0, 1.0]];
        let err = symmetric_eigen(m.view()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PcaError>(),
            Some(PcaError::NotSymmetric { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_and_non_square_are_rejected() {
        let m = array![[1.0, f64::NAN], [f64::NAN, 1.0]];
        let err = symmetric_eigen(m.view()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PcaError>(),
            Some(&PcaError::NonFinite { row: 0, col: 1 })
        );

        let rect = Array2::<f64>::zeros((2, 3));
        let err = symmetric_eigen(rect.view()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PcaError>(),
            Some(&PcaError::NotSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn test_canonicalize_sign() {
        let mut v = array![0.3, -0.9, 0.1];
        canonicalize_sign(&mut v);
        assert_eq!(v, array![-0.3, 0.9, -0.1]);

        let mut already = array![0.6, 0.8];
        canonicalize_sign(&mut already);
        assert_eq!(already, array![0.6, 0.8]);
    }
}
