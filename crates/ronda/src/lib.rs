#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Crate Organization
//!
//! - [`traits`] - Return series, window statistics and the [`Policy`] contract
//! - [`policies`] - Reference allocation policies and their registry
//! - [`eval`] - The backtest engine, drift model and Sharpe ratio
//!
//! ## Timing
//!
//! For a sample of `T` periods and a window of `M` periods there are
//! `T - M` window placements (or exactly one when `M == T`). The window at
//! `shift` covers periods `shift..shift + M`; the period it is evaluated
//! against is `M + shift`, immediately after the window.

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types shared by every ronda crate.
///
/// - [`ReturnSeries`] and [`EstimationWindow`](traits::EstimationWindow)
/// - [`WindowStatistics`] - the moments handed to each policy
/// - [`Policy`] - the allocation contract
pub mod traits {
    pub use ronda_traits::*;
}

pub use ronda_traits::{Policy, ReturnSeries, WindowStatistics};

// Re-export error types
pub use ronda_traits::{Result, RondaError};

// ============================================================================
// Policies
// ============================================================================

/// Reference allocation policies.
///
/// ## Available Policies
///
/// - **EqualWeight** (`equal_weight`): `1/N` in every risky asset
/// - **MinimumVariance** (`min_variance`): `Σ⁻¹·1 / A` from the MLE covariance
///
/// # Example
///
/// ```
/// use ronda::policies::create_policy;
///
/// let mv = create_policy("minvar").unwrap();
/// assert_eq!(mv.name(), "min_variance");
/// ```
pub mod policies {
    pub use ronda_policies::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Backtest engine and performance metrics.
///
/// ## Sharpe Ratio
///
/// ```text
/// SR = mean(r_oos) / std(r_oos, ddof = 1)
/// ```
///
/// rounded to four decimals. A series with no out-of-sample periods, a mean
/// of at most `1e-16` in magnitude or a zero deviation has an
/// [`Undefined`](eval::SharpeRatio::Undefined) ratio.
pub mod eval {
    pub use ronda_eval::*;
}

pub use ronda_eval::{Backtest, BacktestConfig, BacktestResult, SharpeRatio};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Backtest, BacktestConfig, BacktestResult, SharpeRatio};
    pub use crate::{Policy, ReturnSeries, WindowStatistics};
    pub use crate::{Result, RondaError};
}
