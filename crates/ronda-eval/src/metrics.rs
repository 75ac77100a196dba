//! Performance metrics over out-of-sample return series.
//!
//! The Sharpe ratio here is the plain per-period ratio of the mean
//! out-of-sample return to its sample standard deviation. It is neither
//! annualized nor measured in excess of the risk-free rate.

use ndarray::ArrayView1;
use ronda_traits::stats::{mean, sample_std};
use serde::{Deserialize, Serialize};

/// Configuration for metric calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Number of decimal digits the Sharpe ratio is rounded to
    pub sharpe_precision: u32,
    /// Mean returns with magnitude at or below this are treated as zero
    pub zero_mean_tolerance: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sharpe_precision: 4,
            zero_mean_tolerance: 1e-16,
        }
    }
}

/// Sharpe ratio of an out-of-sample return series.
///
/// `Undefined` is a real outcome, not an error: it is returned when there
/// is no out-of-sample series, when the mean is indistinguishable from
/// zero, or when the ratio itself is not finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharpeRatio {
    /// A computed, rounded ratio.
    Value(f64),
    /// No meaningful ratio exists for this series.
    Undefined,
}

impl SharpeRatio {
    /// Calculate the Sharpe ratio of `returns`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use ronda_eval::{MetricsConfig, SharpeRatio};
    ///
    /// let sr = SharpeRatio::calculate(array![-0.01, 0.04].view(), &MetricsConfig::default());
    /// assert_eq!(sr, SharpeRatio::Value(0.4243));
    /// ```
    pub fn calculate(returns: ArrayView1<'_, f64>, config: &MetricsConfig) -> Self {
        let Some(mean) = mean(returns) else {
            return Self::Undefined;
        };
        if mean.abs() <= config.zero_mean_tolerance {
            return Self::Undefined;
        }

        let ratio = mean / sample_std(returns);
        if !ratio.is_finite() {
            return Self::Undefined;
        }

        Self::Value(round_to(ratio, config.sharpe_precision))
    }

    /// The ratio, if defined.
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Undefined => None,
        }
    }

    /// Whether the ratio is undefined.
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl std::fmt::Display for SharpeRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.4}"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// Round the exact binary value of `value` to `digits` decimals.
///
/// Fixed-precision formatting works on the exact decimal expansion, so a
/// double sitting just below a tie (0.16385 is 0.163849999...) rounds down.
fn round_to(value: f64, digits: u32) -> f64 {
    format!("{value:.prec$}", prec = digits as usize)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_sharpe_concrete_scenario() {
        let sr = SharpeRatio::calculate(array![-0.01, 0.04].view(), &MetricsConfig::default());
        // 0.015 / 0.0353553... = 0.42426...
        assert_eq!(sr, SharpeRatio::Value(0.4243));
        assert_eq!(sr.value(), Some(0.4243));
        assert_eq!(sr.to_string(), "0.4243");
    }

    #[test]
    fn test_sharpe_empty_series_undefined() {
        let sr = SharpeRatio::calculate(Array1::<f64>::zeros(0).view(), &MetricsConfig::default());
        assert!(sr.is_undefined());
        assert_eq!(sr.to_string(), "undefined");
    }

    #[test]
    fn test_sharpe_near_zero_mean_undefined() {
        // 1e-17 is lost next to 0.5, so the mean rounds to zero
        let returns = array![1e-17 + 0.5, 1e-17 - 0.5];
        let m: f64 = returns.mean().unwrap();
        assert!(m.abs() <= 1e-16);
        let sr = SharpeRatio::calculate(returns.view(), &MetricsConfig::default());
        assert_eq!(sr, SharpeRatio::Undefined);
    }

    #[test]
    fn test_sharpe_mean_one_e_minus_seventeen() {
        // mean 1e-17, sample std ~1.41e-17
        let returns = array![2e-17, 0.0];
        assert_eq!(returns.mean(), Some(1e-17));
        assert!(returns.std(1.0) > 0.0);
        let config = MetricsConfig::default();
        assert_eq!(SharpeRatio::calculate(returns.view(), &config), SharpeRatio::Undefined);
    }

    #[test]
    fn test_sharpe_zero_is_distinct_from_undefined() {
        let config = MetricsConfig {
            sharpe_precision: 2,
            ..Default::default()
        };
        // ratio 0.001 rounds to 0.00 at two digits but is still a value
        let returns = array![0.001, -0.999, 1.001];
        let sr = SharpeRatio::calculate(returns.view(), &config);
        assert_eq!(sr, SharpeRatio::Value(0.0));
        assert_ne!(sr, SharpeRatio::Undefined);
    }

    #[test]
    fn test_sharpe_sign_symmetry() {
        let config = MetricsConfig::default();
        let returns = array![0.02, -0.01, 0.03, 0.005, -0.002];
        let negated = returns.mapv(|r| -r);

        let sr = SharpeRatio::calculate(returns.view(), &config).value().unwrap();
        let sr_neg = SharpeRatio::calculate(negated.view(), &config).value().unwrap();
        assert_eq!(sr, -sr_neg);
    }

    #[test]
    fn test_sharpe_single_observation_undefined() {
        let sr = SharpeRatio::calculate(array![0.05].view(), &MetricsConfig::default());
        assert!(sr.is_undefined());
    }

    #[test]
    fn test_sharpe_constant_series_undefined() {
        let sr = SharpeRatio::calculate(array![0.25, 0.25, 0.25].view(), &MetricsConfig::default());
        assert!(sr.is_undefined());
    }

    #[test]
    fn test_round_to_uses_exact_binary_value() {
        assert_eq!(round_to(0.16385, 4), 0.1638);
        assert_eq!(round_to(-0.16385, 4), -0.1638);
        assert_eq!(round_to(0.42426406871192845, 4), 0.4243);
        assert_eq!(round_to(1.0, 4), 1.0);
    }

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert_eq!(config.sharpe_precision, 4);
        assert_eq!(config.zero_mean_tolerance, 1e-16);
    }
}
