//! Buy-and-hold weight drift and out-of-sample returns.
//!
//! Both functions look at a single realized period `t` of the full return
//! series: the period immediately after the estimation window of the
//! current shift, `t = window_len + shift`.

use ndarray::{Array1, ArrayView1};
use ronda_traits::{Result, ReturnSeries, RondaError};

/// Total portfolio values at or below this magnitude cannot be renormalized.
pub const MIN_PORTFOLIO_VALUE: f64 = 1e-12;

/// Drifts risky weights `weights` through period `t` without rebalancing.
///
/// The risk-free residual `1 - sum(w)` grows by `1 + rf[t]`. Each risky
/// holding grows by `1 + r[t, i] + rf[t]`; the asset return and the
/// risk-free rate are added, not compounded. The new weights are the grown
/// risky holdings divided by the grown total.
///
/// # Errors
///
/// - [`RondaError::InvalidData`] if `t` is outside the series or the weight
///   vector length does not match the asset count.
/// - [`RondaError::DegeneratePortfolio`] if the grown total is non-finite
///   or within [`MIN_PORTFOLIO_VALUE`] of zero.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ronda_eval::drift::buy_and_hold;
/// use ronda_traits::ReturnSeries;
///
/// let series = ReturnSeries::from_rows(vec![0.0, 0.0], vec![vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
/// let drifted = buy_and_hold(array![0.5, 0.5].view(), &series, 1).unwrap();
/// assert_eq!(drifted, array![0.5, 0.5]);
/// ```
pub fn buy_and_hold(weights: ArrayView1<'_, f64>, series: &ReturnSeries, t: usize) -> Result<Array1<f64>> {
    let (risk_free, risky) = period(series, t)?;
    check_len(weights, risky)?;

    let residual = (1.0 - weights.sum()) * (1.0 + risk_free);
    let growth = risky.mapv(|r| 1.0 + r + risk_free);
    let total = residual + weights.dot(&growth);

    if !total.is_finite() || total.abs() <= MIN_PORTFOLIO_VALUE {
        return Err(RondaError::DegeneratePortfolio(format!(
            "total portfolio value {total:e} at period {t}"
        )));
    }

    Ok(&weights * &growth / total)
}

/// Realized return of risky weights `weights` in period `t`.
///
/// Only the risky leg is counted: `w · r[t]`.
///
/// # Errors
///
/// Returns [`RondaError::InvalidData`] if `t` is outside the series or the
/// weight vector length does not match the asset count.
pub fn out_of_sample_return(weights: ArrayView1<'_, f64>, series: &ReturnSeries, t: usize) -> Result<f64> {
    let (_, risky) = period(series, t)?;
    check_len(weights, risky)?;
    Ok(weights.dot(&risky))
}

fn period(series: &ReturnSeries, t: usize) -> Result<(f64, ArrayView1<'_, f64>)> {
    match (series.risk_free_at(t), series.risky_at(t)) {
        (Some(rf), Some(risky)) => Ok((rf, risky)),
        _ => Err(RondaError::InvalidData(format!(
            "period {t} is outside a series of {} periods",
            series.n_periods()
        ))),
    }
}

fn check_len(weights: ArrayView1<'_, f64>, risky: ArrayView1<'_, f64>) -> Result<()> {
    if weights.len() != risky.len() {
        return Err(RondaError::InvalidData(format!(
            "weight vector has {} entries for {} assets",
            weights.len(),
            risky.len()
        )));
    }
    Ok(())
}
