//! Clean command implementation.
//!
//! Turns raw daily price files into `date,change` return files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{self, CHANGE_COLUMN, DATE_COLUMN, DataError};

/// Column layout of raw price files.
///
/// Columns are addressed by position since price exports disagree on
/// header names. The default matches `date, open, high, low, close,
/// adj_close, volume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CleanConfig {
    /// Position of the date column
    pub(crate) date_column: usize,
    /// Position of the opening price
    pub(crate) open_column: usize,
    /// Position of the adjusted closing price
    pub(crate) adj_close_column: usize,
    /// Extension of the files to process
    pub(crate) extension: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            date_column: 0,
            open_column: 1,
            adj_close_column: 5,
            extension: "csv".to_string(),
        }
    }
}

/// Compute `(adj_close - open) / open` for every row of a price table.
pub(crate) fn price_changes(prices: &DataFrame, config: &CleanConfig) -> data::Result<DataFrame> {
    let columns = prices.get_columns();
    let needed = config.date_column.max(config.open_column).max(config.adj_close_column);
    if columns.len() <= needed {
        return Err(DataError::InvalidData(format!(
            "price table has {} columns, need at least {}",
            columns.len(),
            needed + 1
        )));
    }

    let dates = data::string_values(&columns[config.date_column])?;
    let open = data::float_values(&columns[config.open_column])?;
    let adj_close = data::float_values(&columns[config.adj_close_column])?;

    let changes = open
        .iter()
        .zip(&adj_close)
        .enumerate()
        .map(|(row, (&open_price, &close_price))| {
            if open_price == 0.0 {
                Err(DataError::InvalidData(format!(
                    "zero open price on {}",
                    dates[row]
                )))
            } else {
                Ok((close_price - open_price) / open_price)
            }
        })
        .collect::<data::Result<Vec<f64>>>()?;

    let result = df! {
        DATE_COLUMN => dates,
        CHANGE_COLUMN => changes,
    }?;

    Ok(result)
}

/// Clean one price file into `output`. Returns the number of rows written.
pub(crate) fn clean_file(input: &Path, output: &Path, config: &CleanConfig) -> data::Result<usize> {
    let prices = data::read_csv(input)?;
    let mut changes = price_changes(&prices, config).map_err(|e| match e {
        DataError::InvalidData(msg) => DataError::InvalidData(format!("{}: {msg}", input.display())),
        other => other,
    })?;
    data::write_csv(output, &mut changes)?;
    Ok(changes.height())
}

/// Clean every matching file of `input_dir` into a same-named file in
/// `output_dir`, creating it if needed.
pub(crate) fn clean_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &CleanConfig,
) -> data::Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(DataError::InvalidData(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }
    std::fs::create_dir_all(output_dir).map_err(|e| DataError::io(output_dir, e))?;

    let files = data::collect_files(&[input_dir.to_path_buf()], &config.extension)?;
    let mut written = Vec::with_capacity(files.len());
    for input in files {
        let Some(name) = input.file_name() else {
            continue;
        };
        let output = output_dir.join(name);
        let rows = clean_file(&input, &output, config)?;
        debug!(input = %input.display(), rows, "Cleaned price file");
        written.push(output);
    }

    Ok(written)
}

/// Run the `clean` command.
pub(crate) fn run_clean(input_dir: &Path, output_dir: &Path, config: &CleanConfig) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Cleaning Price Data                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Input:    {}", input_dir.display());
    println!("Output:   {}", output_dir.display());
    println!();

    let written = clean_directory(input_dir, output_dir, config)?;
    info!(files = written.len(), "Price files cleaned");

    for path in &written {
        println!("  {}", path.display());
    }
    println!("\nWrote {} return files.", written.len());

    Ok(())
}
