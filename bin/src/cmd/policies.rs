//! Policies command implementation.

use std::fmt;

use anyhow::Result;
use ronda_policies::available_policies;

/// Listing of the built-in policies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PolicyListing {
    /// Include descriptions, kinds and aliases
    pub(crate) verbose: bool,
}

impl fmt::Display for PolicyListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for info in available_policies() {
            if self.verbose {
                writeln!(f, "  {:15} - {}", info.name, info.description)?;
                writeln!(f, "  {:15}   kind: {}", "", info.kind.description())?;
                writeln!(f, "  {:15}   aliases: {}", "", info.aliases.join(", "))?;
            } else {
                writeln!(f, "  {}", info.name)?;
            }
        }
        Ok(())
    }
}

/// List the available policies.
pub(crate) fn list_policies(verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Policies                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    print!("{}", PolicyListing { verbose });
    println!();

    if !verbose {
        println!("Use --verbose for descriptions and aliases.\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_listing_names() {
        let out = PolicyListing { verbose: false }.to_string();
        assert_eq!(out, "  equal_weight\n  min_variance\n");
    }

    #[test]
    fn test_policy_listing_verbose() {
        let out = PolicyListing { verbose: true }.to_string();
        assert!(out.contains("equal_weight"));
        assert!(out.contains("aliases: ew, 1/n, naive"));
        assert!(out.contains("aliases: mv, minvar, minimum_variance"));
        assert!(out.contains("kind: Rule-based allocation"));
    }
}
