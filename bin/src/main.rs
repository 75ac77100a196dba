//! Ronda CLI binary.
//!
//! Provides a command-line interface for cleaning price files and running
//! rolling-window policy backtests over them.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::backtest::{BacktestArgs, OutputFormat};
use cmd::clean::CleanConfig;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Rolling-window backtester for portfolio allocation policies", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw price files into daily return files
    Clean {
        /// Directory of raw price CSV files
        input: PathBuf,

        /// Directory to write `date,change` files to
        output: PathBuf,

        /// Position of the opening price column
        #[arg(long)]
        open_column: Option<usize>,

        /// Position of the adjusted close column
        #[arg(long)]
        adj_close_column: Option<usize>,

        /// Extension of the files to process
        #[arg(long)]
        extension: Option<String>,
    },

    /// List available policies
    Policies {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run a rolling-window backtest
    Backtest {
        /// Risk-free return file (`date,change`)
        #[arg(long)]
        risk_free: PathBuf,

        /// Asset return files, or directories of them
        #[arg(short, long, num_args = 1.., required = true)]
        assets: Vec<PathBuf>,

        /// Estimation window length in periods
        #[arg(short, long)]
        window: usize,

        /// Policies to evaluate (defaults to equal_weight,min_variance)
        #[arg(short, long, value_delimiter = ',')]
        policies: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Log every window placement
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Backtest { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Clean {
            input,
            output,
            open_column,
            adj_close_column,
            extension,
        } => {
            let mut config = CleanConfig::default();
            if let Some(column) = open_column {
                config.open_column = column;
            }
            if let Some(column) = adj_close_column {
                config.adj_close_column = column;
            }
            if let Some(extension) = extension {
                config.extension = extension;
            }
            cmd::clean::run_clean(&input, &output, &config)?;
        }
        Commands::Policies { verbose } => {
            cmd::policies::list_policies(verbose)?;
        }
        Commands::Backtest {
            risk_free,
            assets,
            window,
            policies,
            start,
            end,
            format,
            verbose: _,
        } => {
            cmd::backtest::run_backtest(&BacktestArgs {
                risk_free,
                assets,
                window,
                policies,
                start,
                end,
                format,
            })?;
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
