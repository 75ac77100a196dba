//! The allocation policy contract.
//!
//! A policy turns the moments of one estimation window into a weight vector
//! over the risky assets. Whatever is not allocated to risky assets,
//! `1 - sum(weights)`, is held in the risk-free asset.

use ndarray::Array1;

use crate::{Result, WindowStatistics};

/// An allocation policy evaluated by the backtest engine.
///
/// Implementors must be thread-safe (Send + Sync) so a configured backtest
/// can be shared across threads.
///
/// # Example
///
/// ```
/// use ndarray::Array1;
/// use ronda_traits::{Policy, Result, WindowStatistics};
///
/// struct AllCash;
///
/// impl Policy for AllCash {
///     fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>> {
///         Ok(Array1::zeros(stats.n_assets))
///     }
///
///     fn name(&self) -> &str {
///         "all_cash"
///     }
/// }
/// ```
pub trait Policy: Send + Sync {
    /// Computes risky-asset weights from the moments of one window.
    ///
    /// The returned vector must have length `stats.n_assets` and contain
    /// only finite values; the engine rejects anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot produce weights from these
    /// moments, e.g. a degenerate precision matrix.
    fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>>;

    /// Display name of the policy.
    ///
    /// Used as the key of backtest results, so it must be unique among the
    /// policies of one backtest and must not change between calls.
    fn name(&self) -> &str;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn weights(&self, stats: &WindowStatistics) -> Result<Array1<f64>> {
        (**self).weights(stats)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
