//! Policy registry for discovering and constructing the built-in policies.

use ronda_traits::{Policy, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::{EqualWeight, MinimumVariance};

/// Which window moments a policy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Ignores the estimated moments.
    Heuristic,
    /// Uses the covariance estimate only.
    Covariance,
}

impl PolicyKind {
    /// Get a human-readable description of the kind.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Heuristic => "Rule-based allocation, no estimation",
            Self::Covariance => "Risk-based allocation from the covariance estimate",
        }
    }
}

/// Metadata about a built-in policy.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyInfo {
    /// Display name, as reported by [`Policy::name`]
    pub name: &'static str,

    /// Which moments the policy consumes
    pub kind: PolicyKind,

    /// Human-readable description
    pub description: &'static str,

    /// Alternative names accepted by [`create_policy`]
    pub aliases: &'static [&'static str],
}

/// Get information about all built-in policies.
#[must_use]
pub fn available_policies() -> Vec<PolicyInfo> {
    vec![
        PolicyInfo {
            name: "equal_weight",
            kind: PolicyKind::Heuristic,
            description: "1/N weight in every risky asset",
            aliases: &["ew", "1/n", "naive"],
        },
        PolicyInfo {
            name: "min_variance",
            kind: PolicyKind::Covariance,
            description: "Global minimum-variance portfolio from the MLE covariance",
            aliases: &["mv", "minvar", "minimum_variance"],
        },
    ]
}

/// Get information about a policy by name or alias.
#[must_use]
pub fn get_policy_info(name: &str) -> Option<PolicyInfo> {
    let name = name.to_lowercase();
    available_policies()
        .into_iter()
        .find(|info| info.name == name || info.aliases.contains(&name.as_str()))
}

/// Create a policy instance by name or alias, with default configuration.
///
/// # Errors
///
/// Returns [`RondaError::InvalidConfig`] for an unknown name.
pub fn create_policy(name: &str) -> Result<Box<dyn Policy>> {
    match get_policy_info(name).map(|info| info.name) {
        Some("equal_weight") => Ok(Box::new(EqualWeight::default())),
        Some("min_variance") => Ok(Box::new(MinimumVariance::new())),
        _ => Err(RondaError::InvalidConfig(format!(
            "Unknown policy: '{}'. Use 'ronda policies' to list available policies.",
            name
        ))),
    }
}
