//! Moment estimation over a single estimation window.
//!
//! [`WindowStatistics::estimate`] is the only producer of the bundle that
//! every [`Policy`](crate::Policy) consumes. A fresh bundle is estimated for
//! each shift of a backtest and dropped once all policies have seen it.

use ndarray::{Array1, Array2, Axis, Slice, concatenate};
use serde::{Deserialize, Serialize};

use crate::stats::{column_means, invert, sample_covariance};
use crate::{EstimationWindow, Result, RondaError};

/// Moments of one estimation window.
///
/// With N risky assets and a window of M periods:
///
/// | Field | Shape | Definition |
/// |-------|-------|------------|
/// | `mean` | N+1 | risk-free mean followed by the risky means |
/// | `sample_cov` | (N+1)×(N+1) | sample covariance of `[risk_free, risky]`, ddof 1 |
/// | `adjusted_cov` | N×N | `(M-1)/(M-N-2) * cov(risky)`, only when `M > N+2` |
/// | `mle_cov` | N×N | `(M-1)/M * cov(risky)` |
/// | `mle_cov_inverse` | N×N | inverse of `mle_cov` |
/// | `a` | scalar | `1' * mle_cov_inverse * 1` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStatistics {
    /// Number of risky assets N.
    pub n_assets: usize,
    /// Window length M.
    pub window_len: usize,
    /// Mean returns, risk-free first (length N+1).
    pub mean: Array1<f64>,
    /// Joint sample covariance of risk-free and risky returns.
    pub sample_cov: Array2<f64>,
    /// Small-sample adjusted risky covariance; `None` when `M <= N+2`.
    pub adjusted_cov: Option<Array2<f64>>,
    /// Maximum-likelihood risky covariance (divisor M).
    pub mle_cov: Array2<f64>,
    /// Inverse of [`mle_cov`](Self::mle_cov).
    pub mle_cov_inverse: Array2<f64>,
    /// Sum of all entries of the precision matrix, `1' Σ⁻¹ 1`.
    pub a: f64,
}

impl WindowStatistics {
    /// Estimates all moments of `window`.
    ///
    /// # Errors
    ///
    /// - [`RondaError::InsufficientData`] if the window has fewer than two
    ///   periods.
    /// - [`RondaError::SingularMatrix`] if the maximum-likelihood covariance
    ///   cannot be inverted, e.g. `M <= N` or collinear assets.
    ///
    /// # Example
    ///
    /// ```
    /// use ronda_traits::{ReturnSeries, WindowStatistics};
    ///
    /// let series = ReturnSeries::from_rows(
    ///     vec![0.01, 0.01, 0.01, 0.01],
    ///     vec![vec![0.02], vec![0.03], vec![-0.01], vec![0.04]],
    /// )
    /// .unwrap();
    ///
    /// let stats = WindowStatistics::estimate(&series.window(0, 2).unwrap()).unwrap();
    /// assert_eq!(stats.mean.len(), 2);
    /// assert!((stats.mle_cov[[0, 0]] - 0.000025).abs() < 1e-15);
    /// ```
    pub fn estimate(window: &EstimationWindow<'_>) -> Result<Self> {
        let m = window.len();
        let n = window.n_assets();
        if m < 2 {
            return Err(RondaError::InsufficientData(format!(
                "estimation window at shift {} has {m} period(s), need at least 2",
                window.shift()
            )));
        }

        let risk_free = window.risk_free().insert_axis(Axis(1));
        let risky = window.risky();
        let joint = concatenate(Axis(1), &[risk_free, risky])
            .map_err(|e| RondaError::InvalidData(e.to_string()))?;

        let mean = column_means(joint.view());
        let sample_cov = sample_covariance(joint.view())?;
        let risky_cov = sample_covariance(risky)?;

        let m_f = m as f64;
        let adjusted_cov = (m > n + 2).then(|| &risky_cov * ((m_f - 1.0) / (m_f - n as f64 - 2.0)));
        let mle_cov = &risky_cov * ((m_f - 1.0) / m_f);

        let mle_cov_inverse = invert(&mle_cov).map_err(|e| match e {
            RondaError::SingularMatrix(msg) => RondaError::SingularMatrix(format!(
                "MLE covariance of window at shift {} ({m} periods, {n} assets): {msg}",
                window.shift()
            )),
            other => other,
        })?;
        let a = mle_cov_inverse.sum();

        Ok(Self {
            n_assets: n,
            window_len: m,
            mean,
            sample_cov,
            adjusted_cov,
            mle_cov,
            mle_cov_inverse,
            a,
        })
    }

    /// Mean of the risk-free asset over the window.
    pub fn risk_free_mean(&self) -> f64 {
        self.mean[0]
    }

    /// Means of the risky assets over the window (length N).
    pub fn risky_mean(&self) -> Array1<f64> {
        self.mean.slice_axis(Axis(0), Slice::from(1..)).to_owned()
    }
}
