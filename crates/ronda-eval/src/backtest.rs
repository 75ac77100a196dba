//! Rolling-window backtesting engine.
//!
//! For every placement of the estimation window the engine estimates the
//! window moments, asks each registered policy for weights, drifts the
//! previous shift's weights through the period after the window and records
//! the out-of-sample return of the fresh weights. Each policy's
//! out-of-sample series is finally reduced to a Sharpe ratio.

use derive_more::{Display, From};
use ndarray::{Array1, Array2};
use ronda_traits::{Policy, Result, ReturnSeries, RondaError, WindowStatistics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::drift::{buy_and_hold, out_of_sample_return};
use crate::metrics::{MetricsConfig, SharpeRatio};

/// Backtesting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Estimation window length M, in periods
    pub window_len: usize,
    /// Sharpe ratio settings
    pub metrics: MetricsConfig,
}

impl BacktestConfig {
    /// Configuration with the given window length and default metrics.
    pub fn new(window_len: usize) -> Self {
        Self {
            window_len,
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        // Ten years of monthly data
        Self::new(120)
    }
}

/// Identifier assigned to a policy when it is registered.
///
/// Ids are registration indices and are stable for the lifetime of a
/// [`Backtest`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[display("policy#{_0}")]
pub struct PolicyId(usize);

impl PolicyId {
    /// Registration index of the policy.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Everything the engine recorded for one policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResult {
    /// Registration id
    pub id: PolicyId,
    /// Display name of the policy
    pub name: String,
    /// Freshly computed weights, one column per shift (N × n_subsets)
    pub weights: Array2<f64>,
    /// Buy-and-hold weights, one column per shift (N × n_subsets)
    pub drifted_weights: Array2<f64>,
    /// Out-of-sample returns, one per shift; empty when n_subsets == 1
    pub out_of_sample: Array1<f64>,
    /// Sharpe ratio of the out-of-sample returns
    pub sharpe_ratio: SharpeRatio,
}

/// Backtesting results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Number of periods T in the return series
    pub n_periods: usize,
    /// Number of risky assets N
    pub n_assets: usize,
    /// Estimation window length M
    pub window_len: usize,
    /// Number of window placements
    pub n_subsets: usize,
    /// Per-policy results in registration order
    pub policies: Vec<PolicyResult>,
}

impl BacktestResult {
    /// Sharpe ratio of every policy, keyed by display name, in registration
    /// order.
    pub fn sharpe_ratios(&self) -> Vec<(&str, SharpeRatio)> {
        self.policies
            .iter()
            .map(|p| (p.name.as_str(), p.sharpe_ratio))
            .collect()
    }

    /// Result of the policy with the given display name.
    pub fn get(&self, name: &str) -> Option<&PolicyResult> {
        self.policies.iter().find(|p| p.name == name)
    }

    /// Result of the policy with the given id.
    pub fn policy(&self, id: PolicyId) -> Option<&PolicyResult> {
        self.policies.get(id.index())
    }
}

/// Number of window placements for a series of `n_periods` periods.
///
/// A window spanning the whole series has a single, in-sample placement.
/// Otherwise every placement is followed by at least one realized period.
pub const fn n_subsets(n_periods: usize, window_len: usize) -> usize {
    if window_len == n_periods {
        1
    } else {
        n_periods.saturating_sub(window_len)
    }
}

/// Backtesting engine.
pub struct Backtest {
    series: ReturnSeries,
    config: BacktestConfig,
    policies: Vec<Box<dyn Policy>>,
}

impl std::fmt::Debug for Backtest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtest")
            .field("n_periods", &self.series.n_periods())
            .field("n_assets", &self.series.n_assets())
            .field("config", &self.config)
            .field("policies", &self.policy_names())
            .finish()
    }
}

impl Backtest {
    /// Create a new backtest over `series`.
    ///
    /// # Arguments
    ///
    /// * `series` - Aligned risk-free and risky returns
    /// * `config` - Backtesting configuration
    /// * `policies` - Non-empty list of policies, in reporting order
    ///
    /// # Errors
    ///
    /// - [`RondaError::InvalidConfig`] if the window length is zero or
    ///   longer than the series, or `policies` is empty.
    /// - [`RondaError::DuplicatePolicy`] if two policies share a name.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ronda_eval::{Backtest, BacktestConfig};
    ///
    /// let backtest = Backtest::new(series, BacktestConfig::new(60), policies)?;
    /// let result = backtest.run()?;
    /// for (name, sharpe) in result.sharpe_ratios() {
    ///     println!("{name}: {sharpe}");
    /// }
    /// ```
    pub fn new(
        series: ReturnSeries,
        config: BacktestConfig,
        policies: Vec<Box<dyn Policy>>,
    ) -> Result<Self> {
        let n_periods = series.n_periods();
        if config.window_len == 0 || config.window_len > n_periods {
            return Err(RondaError::InvalidConfig(format!(
                "window length must be between 1 and {n_periods}, got {}",
                config.window_len
            )));
        }
        if policies.is_empty() {
            return Err(RondaError::InvalidConfig(
                "at least one policy is required".to_string(),
            ));
        }

        let mut backtest = Self {
            series,
            config,
            policies: Vec::with_capacity(policies.len()),
        };
        for policy in policies {
            backtest.add_policy(policy)?;
        }

        Ok(backtest)
    }

    /// Register another policy and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::DuplicatePolicy`] if a policy with the same
    /// display name is already registered.
    pub fn add_policy(&mut self, policy: Box<dyn Policy>) -> Result<PolicyId> {
        if self.policies.iter().any(|p| p.name() == policy.name()) {
            return Err(RondaError::DuplicatePolicy(policy.name().to_string()));
        }

        let id = PolicyId::from(self.policies.len());
        debug!(%id, policy = policy.name(), "Registered policy");
        self.policies.push(policy);
        Ok(id)
    }

    /// Display names of the registered policies, in registration order.
    pub fn policy_names(&self) -> Vec<&str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    /// The return series under test.
    pub const fn series(&self) -> &ReturnSeries {
        &self.series
    }

    /// Run the backtest.
    ///
    /// # Errors
    ///
    /// Any numeric failure aborts the run: a singular covariance matrix, a
    /// policy error or invalid weight vector, or a degenerate drifted
    /// portfolio. No partial result is returned.
    pub fn run(&self) -> Result<BacktestResult> {
        let n_periods = self.series.n_periods();
        let n_assets = self.series.n_assets();
        let window_len = self.config.window_len;
        let n_subsets = n_subsets(n_periods, window_len);
        let out_of_sample = n_subsets > 1;

        info!(
            n_periods,
            n_assets,
            window_len,
            n_subsets,
            policies = self.policies.len(),
            "Starting rolling-window backtest"
        );

        let mut weights = vec![Array2::<f64>::zeros((n_assets, n_subsets)); self.policies.len()];
        let mut drifted = weights.clone();
        let mut returns = vec![Vec::with_capacity(n_subsets); self.policies.len()];

        // Fresh weights of the previous shift, carried into the drift step
        let mut previous: Vec<Array1<f64>> = Vec::new();

        for shift in 0..n_subsets {
            let window = self.series.window(shift, window_len)?;
            let stats = WindowStatistics::estimate(&window)?;
            // First realized period after the window
            let t = window_len + shift;
            debug!(shift, a = stats.a, "Estimated window statistics");

            let mut current = Vec::with_capacity(self.policies.len());
            for (k, policy) in self.policies.iter().enumerate() {
                let fresh = self.compute_weights(policy.as_ref(), &stats)?;

                let held = match previous.get(k) {
                    Some(prev) => buy_and_hold(prev.view(), &self.series, t).map_err(|e| match e {
                        RondaError::DegeneratePortfolio(msg) => RondaError::DegeneratePortfolio(
                            format!("policy '{}' at shift {shift}: {msg}", policy.name()),
                        ),
                        other => other,
                    })?,
                    None => fresh.clone(),
                };

                if out_of_sample {
                    returns[k].push(out_of_sample_return(fresh.view(), &self.series, t)?);
                }

                weights[k].column_mut(shift).assign(&fresh);
                drifted[k].column_mut(shift).assign(&held);
                current.push(fresh);
            }
            previous = current;
        }

        let policies = self
            .policies
            .iter()
            .zip(weights.into_iter().zip(drifted).zip(returns))
            .enumerate()
            .map(|(k, (policy, ((weights, drifted_weights), returns)))| {
                let out_of_sample = Array1::from_vec(returns);
                let sharpe_ratio = SharpeRatio::calculate(out_of_sample.view(), &self.config.metrics);
                info!(policy = policy.name(), sharpe = %sharpe_ratio, "Policy evaluated");

                PolicyResult {
                    id: PolicyId::from(k),
                    name: policy.name().to_string(),
                    weights,
                    drifted_weights,
                    out_of_sample,
                    sharpe_ratio,
                }
            })
            .collect();

        Ok(BacktestResult {
            n_periods,
            n_assets,
            window_len,
            n_subsets,
            policies,
        })
    }

    /// Ask `policy` for weights and validate them.
    fn compute_weights(&self, policy: &dyn Policy, stats: &WindowStatistics) -> Result<Array1<f64>> {
        let weights = policy.weights(stats)?;

        if weights.len() != stats.n_assets {
            return Err(RondaError::PolicyComputation {
                policy: policy.name().to_string(),
                message: format!(
                    "returned {} weights for {} assets",
                    weights.len(),
                    stats.n_assets
                ),
            });
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(RondaError::PolicyComputation {
                policy: policy.name().to_string(),
                message: "returned non-finite weights".to_string(),
            });
        }

        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ronda_policies::{EqualWeight, MinimumVariance};

    /// Returns a fixed weight vector regardless of the window.
    struct Fixed {
        name: &'static str,
        weights: Vec<f64>,
    }

    impl Policy for Fixed {
        fn weights(&self, _stats: &WindowStatistics) -> Result<Array1<f64>> {
            Ok(Array1::from_vec(self.weights.clone()))
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn fixed(name: &'static str, weights: Vec<f64>) -> Box<dyn Policy> {
        Box::new(Fixed { name, weights })
    }

    fn scenario_series() -> ReturnSeries {
        ReturnSeries::from_rows(
            vec![0.01, 0.01, 0.01, 0.01],
            vec![vec![0.02], vec![0.03], vec![-0.01], vec![0.04]],
        )
        .unwrap()
    }

    fn synthetic_series(n_periods: usize, n_assets: usize) -> ReturnSeries {
        let risk_free = vec![0.002; n_periods];
        let risky = (0..n_periods)
            .map(|t| {
                (0..n_assets)
                    .map(|i| 0.01 * ((t * (i + 3)) as f64 * 0.41 + i as f64).sin() + 0.001 * i as f64)
                    .collect()
            })
            .collect();
        ReturnSeries::from_rows(risk_free, risky).unwrap()
    }

    #[test]
    fn test_backtest_config_default() {
        let config = BacktestConfig::default();
        assert_eq!(config.window_len, 120);
        assert_eq!(config.metrics.sharpe_precision, 4);
    }

    #[test]
    fn test_n_subsets() {
        assert_eq!(n_subsets(4, 4), 1);
        assert_eq!(n_subsets(4, 2), 2);
        assert_eq!(n_subsets(4, 3), 1);
        assert_eq!(n_subsets(100, 60), 40);
    }

    #[test]
    fn test_concrete_scenario() {
        let backtest = Backtest::new(
            scenario_series(),
            BacktestConfig::new(2),
            vec![Box::new(EqualWeight::default())],
        )
        .unwrap();
        let result = backtest.run().unwrap();

        assert_eq!(result.n_subsets, 2);
        let ew = result.get("equal_weight").unwrap();
        assert_eq!(ew.weights.dim(), (1, 2));
        assert_eq!(ew.out_of_sample.to_vec(), vec![-0.01, 0.04]);
        assert_eq!(ew.sharpe_ratio, SharpeRatio::Value(0.4243));
        assert_eq!(result.sharpe_ratios(), vec![("equal_weight", SharpeRatio::Value(0.4243))]);
    }

    #[test]
    fn test_full_window_is_in_sample_only() {
        let backtest = Backtest::new(
            synthetic_series(24, 2),
            BacktestConfig::new(24),
            vec![Box::new(EqualWeight::default()), Box::new(MinimumVariance::new())],
        )
        .unwrap();
        let result = backtest.run().unwrap();

        assert_eq!(result.n_subsets, 1);
        for policy in &result.policies {
            assert_eq!(policy.weights.ncols(), 1);
            assert_eq!(policy.drifted_weights.ncols(), 1);
            assert!(policy.out_of_sample.is_empty());
            assert_eq!(policy.sharpe_ratio, SharpeRatio::Undefined);
        }
    }

    #[test]
    fn test_matrix_shapes() {
        let backtest = Backtest::new(
            synthetic_series(50, 3),
            BacktestConfig::new(20),
            vec![Box::new(EqualWeight::default()), Box::new(MinimumVariance::new())],
        )
        .unwrap();
        let result = backtest.run().unwrap();

        assert_eq!(result.n_subsets, 30);
        for policy in &result.policies {
            assert_eq!(policy.weights.dim(), (3, 30));
            assert_eq!(policy.drifted_weights.dim(), (3, 30));
            assert_eq!(policy.out_of_sample.len(), 30);
        }
    }

    #[test]
    fn test_drift_uses_previous_fresh_weights() {
        let series = synthetic_series(30, 2);
        let backtest = Backtest::new(
            series.clone(),
            BacktestConfig::new(10),
            vec![Box::new(MinimumVariance::new())],
        )
        .unwrap();
        let result = backtest.run().unwrap();
        let mv = result.get("min_variance").unwrap();

        // Inception: drifted column equals fresh column
        assert_eq!(mv.drifted_weights.column(0), mv.weights.column(0));

        for shift in 1..result.n_subsets {
            let expected = buy_and_hold(mv.weights.column(shift - 1), &series, 10 + shift).unwrap();
            for i in 0..2 {
                assert_abs_diff_eq!(mv.drifted_weights[[i, shift]], expected[i], epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_out_of_sample_uses_row_after_window() {
        let series = synthetic_series(15, 2);
        let backtest = Backtest::new(
            series.clone(),
            BacktestConfig::new(5),
            vec![fixed("fixed", vec![0.3, 0.7])],
        )
        .unwrap();
        let result = backtest.run().unwrap();
        let oos = &result.policies[0].out_of_sample;

        for shift in 0..result.n_subsets {
            let row = series.risky_at(5 + shift).unwrap();
            assert_abs_diff_eq!(oos[shift], 0.3 * row[0] + 0.7 * row[1], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_results_in_registration_order() {
        let mut backtest = Backtest::new(
            synthetic_series(20, 2),
            BacktestConfig::new(8),
            vec![Box::new(MinimumVariance::new())],
        )
        .unwrap();
        let id = backtest.add_policy(Box::new(EqualWeight::default())).unwrap();
        assert_eq!(id.index(), 1);
        assert_eq!(id.to_string(), "policy#1");

        let result = backtest.run().unwrap();
        let names: Vec<&str> = result.sharpe_ratios().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["min_variance", "equal_weight"]);
        assert_eq!(result.policy(id).unwrap().name, "equal_weight");
    }

    #[test]
    fn test_duplicate_policy_rejected() {
        let result = Backtest::new(
            scenario_series(),
            BacktestConfig::new(2),
            vec![fixed("same", vec![1.0]), fixed("same", vec![0.5])],
        );
        assert!(matches!(result, Err(RondaError::DuplicatePolicy(ref n)) if n == "same"));

        let mut backtest =
            Backtest::new(scenario_series(), BacktestConfig::new(2), vec![fixed("a", vec![1.0])]).unwrap();
        assert!(matches!(
            backtest.add_policy(fixed("a", vec![0.0])),
            Err(RondaError::DuplicatePolicy(_))
        ));
        assert_eq!(backtest.policy_names(), vec!["a"]);
    }

    #[test]
    fn test_invalid_configuration() {
        let policies = || vec![fixed("a", vec![1.0])];
        assert!(matches!(
            Backtest::new(scenario_series(), BacktestConfig::new(0), policies()),
            Err(RondaError::InvalidConfig(_))
        ));
        assert!(matches!(
            Backtest::new(scenario_series(), BacktestConfig::new(5), policies()),
            Err(RondaError::InvalidConfig(_))
        ));
        assert!(matches!(
            Backtest::new(scenario_series(), BacktestConfig::new(2), Vec::new()),
            Err(RondaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_wrong_weight_length_aborts() {
        let backtest = Backtest::new(
            synthetic_series(12, 2),
            BacktestConfig::new(6),
            vec![fixed("short", vec![1.0])],
        )
        .unwrap();
        assert!(matches!(
            backtest.run(),
            Err(RondaError::PolicyComputation { ref policy, .. }) if policy == "short"
        ));
    }

    #[test]
    fn test_non_finite_weights_abort() {
        let backtest = Backtest::new(
            synthetic_series(12, 2),
            BacktestConfig::new(6),
            vec![fixed("nan", vec![f64::NAN, 0.5])],
        )
        .unwrap();
        assert!(matches!(backtest.run(), Err(RondaError::PolicyComputation { .. })));
    }

    #[test]
    fn test_singular_window_aborts() {
        // Three assets with a two-period window cannot be inverted
        let backtest = Backtest::new(
            synthetic_series(10, 3),
            BacktestConfig::new(2),
            vec![Box::new(EqualWeight::default())],
        )
        .unwrap();
        assert!(matches!(backtest.run(), Err(RondaError::SingularMatrix(_))));
    }

    #[test]
    fn test_degenerate_drift_aborts() {
        // All-in on an asset that loses everything in period 3, drifted at shift 1
        let series = ReturnSeries::from_rows(
            vec![0.0; 5],
            vec![vec![0.01], vec![0.02], vec![0.03], vec![-1.0], vec![0.02]],
        )
        .unwrap();
        let backtest =
            Backtest::new(series, BacktestConfig::new(2), vec![fixed("all_in", vec![1.0])]).unwrap();
        assert!(matches!(backtest.run(), Err(RondaError::DegeneratePortfolio(_))));
    }

    #[test]
    fn test_run_does_not_mutate_series() {
        let series = synthetic_series(20, 2);
        let backtest = Backtest::new(
            series.clone(),
            BacktestConfig::new(10),
            vec![Box::new(MinimumVariance::new())],
        )
        .unwrap();
        let first = backtest.run().unwrap();
        let second = backtest.run().unwrap();

        assert_eq!(backtest.series(), &series);
        assert_eq!(first.policies[0].weights, second.policies[0].weights);
        assert_eq!(first.policies[0].sharpe_ratio, second.policies[0].sharpe_ratio);
    }

    #[test]
    fn test_debug_lists_policies() {
        let backtest = Backtest::new(
            scenario_series(),
            BacktestConfig::new(2),
            vec![Box::new(EqualWeight::default())],
        )
        .unwrap();
        let debug = format!("{backtest:?}");
        assert!(debug.contains("equal_weight"));
    }
}
