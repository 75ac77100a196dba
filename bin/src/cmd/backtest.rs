//! Backtest command implementation.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use ronda_eval::{Backtest, BacktestConfig, BacktestResult};
use ronda_policies::create_policy;
use ronda_traits::Policy;
use serde::Serialize;
use tracing::info;

use crate::data::{self, LoadedReturns};

/// Policies run when none are requested.
pub(crate) const DEFAULT_POLICIES: [&str; 2] = ["equal_weight", "min_variance"];

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable Sharpe table
    Text,
    /// Full result as JSON
    Json,
}

/// Arguments of the `backtest` command.
#[derive(Debug, Clone)]
pub(crate) struct BacktestArgs {
    pub(crate) risk_free: PathBuf,
    pub(crate) assets: Vec<PathBuf>,
    pub(crate) window: usize,
    pub(crate) policies: Vec<String>,
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) format: OutputFormat,
}

/// Everything reported for one run.
#[derive(Debug, Serialize)]
pub(crate) struct BacktestReport<'a> {
    assets: &'a [String],
    first_date: &'a str,
    last_date: &'a str,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

impl<'a> BacktestReport<'a> {
    pub(crate) fn new(loaded: &'a LoadedReturns, result: &'a BacktestResult) -> Self {
        Self {
            assets: &loaded.assets,
            first_date: loaded.dates.first().map_or("", String::as_str),
            last_date: loaded.dates.last().map_or("", String::as_str),
            result,
        }
    }
}

/// Sharpe table of a run.
impl fmt::Display for BacktestReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;

        writeln!(f, "Assets:   {} ({})", self.assets.len(), self.assets.join(", "))?;
        writeln!(
            f,
            "Periods:  {} ({} to {})",
            result.n_periods, self.first_date, self.last_date
        )?;
        writeln!(f, "Window:   {} periods", result.window_len)?;
        writeln!(f, "Subsets:  {}", result.n_subsets)?;
        writeln!(f)?;

        writeln!(f, "{:20} {:>12} {:>14}", "Policy", "Sharpe", "Mean Return")?;
        writeln!(f, "{}", "-".repeat(48))?;
        for policy in &result.policies {
            let mean = policy
                .out_of_sample
                .mean()
                .map_or_else(|| "-".to_string(), |m| format!("{m:.6}"));
            writeln!(
                f,
                "{:20} {:>12} {:>14}",
                policy.name,
                policy.sharpe_ratio.to_string(),
                mean
            )?;
        }

        Ok(())
    }
}

/// Build the requested policies, falling back to [`DEFAULT_POLICIES`].
pub(crate) fn select_policies(names: &[String]) -> Result<Vec<Box<dyn Policy>>> {
    if names.is_empty() {
        return DEFAULT_POLICIES
            .iter()
            .map(|name| Ok(create_policy(name)?))
            .collect();
    }

    names
        .iter()
        .map(|name| create_policy(name.trim()).with_context(|| format!("unknown policy '{name}'")))
        .collect()
}

/// Run a backtest over return files on disk.
pub(crate) fn run_backtest(args: &BacktestArgs) -> Result<()> {
    let start = args.start.as_deref().map(data::parse_date).transpose()?;
    let end = args.end.as_deref().map(data::parse_date).transpose()?;

    let assets = data::collect_files(&args.assets, "csv")?;
    let loaded = data::load_returns(&args.risk_free, &assets, start, end)
        .context("failed to load return files")?;

    let policies = select_policies(&args.policies)?;
    let backtest = Backtest::new(loaded.series.clone(), BacktestConfig::new(args.window), policies)?;
    info!(
        periods = backtest.series().n_periods(),
        assets = backtest.series().n_assets(),
        policies = ?backtest.policy_names(),
        "Loaded return series"
    );
    let result = backtest.run()?;
    let report = BacktestReport::new(&loaded, &result);

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                       Backtesting                            ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");
            print!("{report}");
            println!();
        }
    }

    Ok(())
}
