//! Global minimum-variance allocation policy.

use ndarray::Array1;
use ronda_traits::{Policy, Result, RondaError, WindowStatistics};

/// Global minimum-variance portfolio of the risky assets.
///
/// Weights are `Σ⁻¹ 1 / (1' Σ⁻¹ 1)`, using the maximum-likelihood covariance
/// of the window. The portfolio is fully invested in risky assets and may
/// hold short positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumVariance;

impl MinimumVariance {
    /// Create a new minimum-variance policy.
    pub const fn new() -> Self {
        Self
    }
}

impl Policy for MinimumVariance {
    fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>> {
        if !stats.a.is_finite() || stats.a <= 0.0 {
            return Err(RondaError::PolicyComputation {
                policy: self.name().to_string(),
                message: format!("1' Σ⁻¹ 1 must be positive and finite, got {}", stats.a),
            });
        }

        let ones = Array1::<f64>::ones(stats.n_assets);
        Ok(stats.mle_cov_inverse.dot(&ones) / stats.a)
    }

    fn name(&self) -> &str {
        "min_variance"
    }
}
