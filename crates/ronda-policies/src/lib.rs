//! Reference allocation policies for the Ronda backtester.
//!
//! Each policy implements [`ronda_traits::Policy`]: it receives the moments
//! of one estimation window and returns risky-asset weights.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_policies::{EqualWeight, MinimumVariance, create_policy};
//! use ronda_traits::Policy;
//!
//! let policies: Vec<Box<dyn Policy>> = vec![
//!     Box::new(EqualWeight::default()),
//!     Box::new(MinimumVariance::new()),
//! ];
//! assert_eq!(policies[1].name(), "min_variance");
//!
//! let by_name = create_policy("ew").unwrap();
//! assert_eq!(by_name.name(), "equal_weight");
//! ```

mod equal_weight;
mod min_variance;
pub mod registry;

// Re-export main types
pub use equal_weight::{EqualWeight, EqualWeightConfig};
pub use min_variance::MinimumVariance;
pub use registry::{PolicyInfo, PolicyKind, available_policies, create_policy, get_policy_info};
