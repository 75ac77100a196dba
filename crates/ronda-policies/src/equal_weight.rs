//! Equal-weighted (1/N) allocation policy.

use ndarray::Array1;
use ronda_traits::{Policy, Result, RondaError, WindowStatistics};
use serde::{Deserialize, Serialize};

/// Configuration for the equal-weight policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqualWeightConfig {
    /// Total fraction of wealth spread across the risky assets. The rest is
    /// held in the risk-free asset.
    pub risky_exposure: f64,
}

impl Default for EqualWeightConfig {
    fn default() -> Self {
        Self {
            risky_exposure: 1.0,
        }
    }
}

/// Naive diversification: every risky asset receives the same weight.
///
/// Ignores the estimated moments entirely, which makes it the usual
/// benchmark for estimation-heavy policies.
///
/// # Examples
///
/// ```rust,no_run
/// use ronda_policies::{EqualWeight, EqualWeightConfig};
/// use ronda_traits::Policy;
///
/// let policy = EqualWeight::new(EqualWeightConfig { risky_exposure: 0.6 });
/// assert_eq!(policy.name(), "equal_weight");
/// ```
#[derive(Debug, Clone)]
pub struct EqualWeight {
    config: EqualWeightConfig,
}

impl EqualWeight {
    /// Create a new equal-weight policy with the given configuration.
    pub const fn new(config: EqualWeightConfig) -> Self {
        Self { config }
    }
}

impl Default for EqualWeight {
    fn default() -> Self {
        Self::new(EqualWeightConfig::default())
    }
}

impl Policy for EqualWeight {
    fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>> {
        if stats.n_assets == 0 {
            return Err(RondaError::PolicyComputation {
                policy: self.name().to_string(),
                message: "no risky assets".to_string(),
            });
        }
        if !self.config.risky_exposure.is_finite() {
            return Err(RondaError::InvalidConfig(format!(
                "risky exposure must be finite, got {}",
                self.config.risky_exposure
            )));
        }

        let weight = self.config.risky_exposure / stats.n_assets as f64;
        Ok(Array1::from_elem(stats.n_assets, weight))
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}
