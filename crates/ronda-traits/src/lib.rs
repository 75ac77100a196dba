#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the Ronda portfolio backtester.
//!
//! This crate provides the return-series types, the per-window moment
//! estimator and the [`Policy`] contract that allocation policies implement.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod policy;
pub mod statistics;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use policy::Policy;
pub use statistics::WindowStatistics;
pub use types::{EstimationWindow, ReturnSeries};
