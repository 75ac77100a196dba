//! Rolling-window backtesting and performance evaluation for ronda.
//!
//! This crate provides the pieces of an out-of-sample policy backtest:
//! - Buy-and-hold weight drift between re-estimations
//! - Out-of-sample return accounting
//! - Sharpe ratio aggregation with an explicit undefined outcome
//! - The rolling-window backtest engine that ties them together
//!
//! # Example
//!
//! ```rust
//! use ronda_eval::{Backtest, BacktestConfig, SharpeRatio};
//! use ronda_traits::{Policy, Result, ReturnSeries, WindowStatistics};
//! use ndarray::Array1;
//!
//! struct FullyInvested;
//!
//! impl Policy for FullyInvested {
//!     fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>> {
//!         Ok(Array1::from_elem(stats.n_assets, 1.0 / stats.n_assets as f64))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "fully_invested"
//!     }
//! }
//!
//! let series = ReturnSeries::from_rows(
//!     vec![0.01, 0.01, 0.01, 0.01],
//!     vec![vec![0.02], vec![0.03], vec![-0.01], vec![0.04]],
//! )
//! .unwrap();
//!
//! let backtest = Backtest::new(series, BacktestConfig::new(2), vec![Box::new(FullyInvested)]).unwrap();
//! let result = backtest.run().unwrap();
//! assert_eq!(result.sharpe_ratios(), vec![("fully_invested", SharpeRatio::Value(0.4243))]);
//! ```

pub mod backtest;
pub mod drift;
pub mod metrics;

// Re-export main types
pub use backtest::{Backtest, BacktestConfig, BacktestResult, PolicyId, PolicyResult, n_subsets};
pub use drift::{buy_and_hold, out_of_sample_return};
pub use metrics::{MetricsConfig, SharpeRatio};
