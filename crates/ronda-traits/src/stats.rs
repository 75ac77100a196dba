//! Statistical and linear-algebra helpers.
//!
//! This module provides the small set of numeric routines the moment
//! estimator and the reference policies share: column means, sample
//! covariance, sample standard deviation and a pivoted Gauss-Jordan matrix
//! inverse.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Slice};

use crate::{Result, RondaError};

/// Relative pivot threshold below which a matrix is treated as singular.
///
/// Pivots are compared against the largest absolute entry of the input, so
/// the check is independent of the scale of the returns.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Per-column arithmetic mean of a (rows × cols) matrix.
///
/// Returns an empty vector when the matrix has no rows.
pub fn column_means(data: ArrayView2<'_, f64>) -> Array1<f64> {
    data.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(data.ncols()))
}

/// Sample covariance of the columns of `data` (rows are observations),
/// normalized by `rows - 1`.
///
/// # Errors
///
/// Returns [`RondaError::InsufficientData`] with fewer than two rows.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use ronda_traits::stats::sample_covariance;
///
/// let data = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
/// let cov = sample_covariance(data.view()).unwrap();
///
/// assert!((cov[[0, 0]] - 1.0).abs() < 1e-12);
/// assert!((cov[[0, 1]] - 2.0).abs() < 1e-12);
/// assert!((cov[[1, 1]] - 4.0).abs() < 1e-12);
/// ```
pub fn sample_covariance(data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let n_obs = data.nrows();
    if n_obs < 2 {
        return Err(RondaError::InsufficientData(format!(
            "sample covariance needs at least 2 observations, got {n_obs}"
        )));
    }

    let means = column_means(data);
    let centered = &data - &means;
    Ok(centered.t().dot(&centered) / (n_obs - 1) as f64)
}

/// Arithmetic mean of a series, `None` when empty.
pub fn mean(values: ArrayView1<'_, f64>) -> Option<f64> {
    values.mean()
}

/// Sample standard deviation (ddof = 1). NaN with fewer than two values.
pub fn sample_std(values: ArrayView1<'_, f64>) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.std(1.0)
}

/// Inverts a square matrix by Gauss-Jordan elimination with partial
/// pivoting.
///
/// # Errors
///
/// Returns [`RondaError::InvalidData`] for a non-square or empty matrix and
/// [`RondaError::SingularMatrix`] when a pivot falls below
/// [`SINGULARITY_TOLERANCE`] relative to the largest entry, or the result is
/// not finite.
pub fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    if n == 0 || n != matrix.ncols() {
        return Err(RondaError::InvalidData(format!(
            "cannot invert a {}x{} matrix",
            matrix.nrows(),
            matrix.ncols()
        )));
    }

    let scale = matrix.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(RondaError::SingularMatrix(format!(
            "{n}x{n} matrix has no finite non-zero entries"
        )));
    }
    let tolerance = SINGULARITY_TOLERANCE * scale;

    // Augmented [A | I]
    let mut aug = Array2::<f64>::zeros((n, 2 * n));
    aug.slice_axis_mut(Axis(1), Slice::from(..n)).assign(matrix);
    for i in 0..n {
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut pivot_row = col;
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > aug[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }

        if aug[[pivot_row, col]].abs() <= tolerance {
            return Err(RondaError::SingularMatrix(format!(
                "pivot {:.3e} in column {col} is below tolerance {tolerance:.3e}",
                aug[[pivot_row, col]].abs()
            )));
        }

        if pivot_row != col {
            for j in 0..(2 * n) {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        aug.row_mut(col).mapv_inplace(|x| x / pivot);

        let pivot_values = aug.row(col).to_owned();
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                if factor != 0.0 {
                    aug.row_mut(row).scaled_add(-factor, &pivot_values);
                }
            }
        }
    }

    let inverse = aug.slice_axis(Axis(1), Slice::from(n..)).to_owned();
    if inverse.iter().any(|x| !x.is_finite()) {
        return Err(RondaError::SingularMatrix(
            "inverse contains non-finite values".to_string(),
        ));
    }

    Ok(inverse)
}
