//! Return series and estimation windows.
//!
//! A [`ReturnSeries`] holds the aligned risk-free and risky return histories
//! a backtest consumes. An [`EstimationWindow`] is a borrowed, contiguous
//! slice of that history used to estimate moments for one shift.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Slice};

use crate::{Result, RondaError};

/// Aligned risk-free and risky-asset return histories.
///
/// Row `t` of the risky matrix and element `t` of the risk-free vector refer
/// to the same period. The series is validated once on construction and is
/// never mutated afterwards.
///
/// # Example
///
/// ```
/// use ronda_traits::ReturnSeries;
///
/// let series = ReturnSeries::from_rows(
///     vec![0.01, 0.01, 0.01],
///     vec![vec![0.02, 0.01], vec![0.03, -0.02], vec![-0.01, 0.00]],
/// )
/// .unwrap();
///
/// assert_eq!(series.n_periods(), 3);
/// assert_eq!(series.n_assets(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    risk_free: Array1<f64>,
    risky: Array2<f64>,
}

impl ReturnSeries {
    /// Creates a return series from a risk-free vector (length T) and a
    /// risky matrix (T × N).
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] if the lengths disagree, there
    /// are no periods or no risky assets, or any value is non-finite.
    pub fn new(risk_free: Array1<f64>, risky: Array2<f64>) -> Result<Self> {
        if risk_free.len() != risky.nrows() {
            return Err(RondaError::InvalidData(format!(
                "risk-free series has {} periods but risky series has {}",
                risk_free.len(),
                risky.nrows()
            )));
        }
        if risk_free.is_empty() {
            return Err(RondaError::InvalidData("return series is empty".to_string()));
        }
        if risky.ncols() == 0 {
            return Err(RondaError::InvalidData(
                "return series has no risky assets".to_string(),
            ));
        }
        if let Some(t) = risk_free.iter().position(|x| !x.is_finite()) {
            return Err(RondaError::InvalidData(format!(
                "non-finite risk-free return at period {t}"
            )));
        }
        if let Some(((t, i), _)) = risky.indexed_iter().find(|(_, x)| !x.is_finite()) {
            return Err(RondaError::InvalidData(format!(
                "non-finite return for asset {i} at period {t}"
            )));
        }

        Ok(Self { risk_free, risky })
    }

    /// Creates a return series from plain row-major vectors.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] if the risky rows are ragged, in
    /// addition to every check made by [`ReturnSeries::new`].
    pub fn from_rows(risk_free: Vec<f64>, risky: Vec<Vec<f64>>) -> Result<Self> {
        let n_assets = risky.first().map_or(0, Vec::len);
        if let Some(t) = risky.iter().position(|row| row.len() != n_assets) {
            return Err(RondaError::InvalidData(format!(
                "risky row {t} has {} assets, expected {n_assets}",
                risky[t].len()
            )));
        }

        let n_periods = risky.len();
        let flat: Vec<f64> = risky.into_iter().flatten().collect();
        let risky = Array2::from_shape_vec((n_periods, n_assets), flat)
            .map_err(|e| RondaError::InvalidData(e.to_string()))?;

        Self::new(Array1::from_vec(risk_free), risky)
    }

    /// Number of periods T.
    pub fn n_periods(&self) -> usize {
        self.risk_free.len()
    }

    /// Number of risky assets N.
    pub fn n_assets(&self) -> usize {
        self.risky.ncols()
    }

    /// The risk-free return series.
    pub const fn risk_free(&self) -> &Array1<f64> {
        &self.risk_free
    }

    /// The risky return matrix (periods × assets).
    pub const fn risky(&self) -> &Array2<f64> {
        &self.risky
    }

    /// Risk-free return of period `t`.
    pub fn risk_free_at(&self, t: usize) -> Option<f64> {
        self.risk_free.get(t).copied()
    }

    /// Risky returns of period `t`.
    pub fn risky_at(&self, t: usize) -> Option<ArrayView1<'_, f64>> {
        (t < self.n_periods()).then(|| self.risky.row(t))
    }

    /// Borrows the `len` periods starting at `shift`.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidData`] if the window is empty or runs
    /// past the end of the series.
    pub fn window(&self, shift: usize, len: usize) -> Result<EstimationWindow<'_>> {
        if len == 0 || shift + len > self.n_periods() {
            return Err(RondaError::InvalidData(format!(
                "window [{shift}, {}) does not fit a series of {} periods",
                shift + len,
                self.n_periods()
            )));
        }

        Ok(EstimationWindow {
            shift,
            risk_free: self.risk_free.slice_axis(Axis(0), Slice::from(shift..shift + len)),
            risky: self.risky.slice_axis(Axis(0), Slice::from(shift..shift + len)),
        })
    }
}

/// A contiguous run of periods used to estimate moments.
#[derive(Debug, Clone, Copy)]
pub struct EstimationWindow<'a> {
    shift: usize,
    risk_free: ArrayView1<'a, f64>,
    risky: ArrayView2<'a, f64>,
}

impl<'a> EstimationWindow<'a> {
    /// Offset of the first period in the window.
    pub const fn shift(&self) -> usize {
        self.shift
    }

    /// Number of periods M in the window.
    pub fn len(&self) -> usize {
        self.risk_free.len()
    }

    /// Whether the window is empty. Windows built by
    /// [`ReturnSeries::window`] never are.
    pub fn is_empty(&self) -> bool {
        self.risk_free.is_empty()
    }

    /// Number of risky assets N.
    pub fn n_assets(&self) -> usize {
        self.risky.ncols()
    }

    /// Risk-free returns inside the window.
    pub const fn risk_free(&self) -> ArrayView1<'a, f64> {
        self.risk_free
    }

    /// Risky returns inside the window (periods × assets).
    pub const fn risky(&self) -> ArrayView2<'a, f64> {
        self.risky
    }
}
