//! Data loading utilities for the Ronda CLI.
//!
//! Return files are two-column CSVs (`date,change`). The risk-free file and
//! every asset file are inner-joined on `date`, so only periods present in
//! all of them survive.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use ronda_traits::{ReturnSeries, RondaError};
use thiserror::Error;

/// Name of the date column in return files.
pub(crate) const DATE_COLUMN: &str = "date";

/// Name of the return column in return files.
pub(crate) const CHANGE_COLUMN: &str = "change";

const RISK_FREE_COLUMN: &str = "risk_free";

/// Errors raised while reading or writing data files.
#[derive(Debug, Error)]
pub(crate) enum DataError {
    /// Filesystem error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Date that cannot be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Malformed file contents
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Library error while assembling the series
    #[error(transparent)]
    Ronda(#[from] RondaError),
}

impl DataError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, DataError>;

/// Returns loaded from disk, aligned on their common dates.
#[derive(Debug)]
pub(crate) struct LoadedReturns {
    /// Sorted dates shared by every input file
    pub(crate) dates: Vec<String>,
    /// Asset names, in column order
    pub(crate) assets: Vec<String>,
    /// The aligned series
    pub(crate) series: ReturnSeries,
}

/// Read a CSV file with a header row.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a DataFrame to `path` as CSV with a header row.
pub(crate) fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = std::fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Expand a list of files and directories into files.
///
/// Directories contribute every file with the given extension (compared
/// case-insensitively), sorted by path. Plain files are kept as given.
pub(crate) fn collect_files(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(input).map_err(|e| DataError::io(input, e))? {
                let path = entry.map_err(|e| DataError::io(input, e))?.path();
                let matches = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
                if path.is_file() && matches {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

/// Display name of a return file: its file stem.
pub(crate) fn asset_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the risk-free file and the asset files into one aligned series.
///
/// Dates are compared as text after sorting; `start` and `end` are
/// inclusive bounds applied after the join.
pub(crate) fn load_returns(
    risk_free: &Path,
    assets: &[PathBuf],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<LoadedReturns> {
    if assets.is_empty() {
        return Err(DataError::InvalidData("no asset files given".to_string()));
    }

    let mut joined = returns_frame(risk_free, RISK_FREE_COLUMN)?;
    for (i, path) in assets.iter().enumerate() {
        let right = returns_frame(path, &asset_column(i))?;
        joined = joined.join(
            right,
            [col(DATE_COLUMN)],
            [col(DATE_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        );
    }
    let df = joined.sort([DATE_COLUMN], SortMultipleOptions::default()).collect()?;

    let dates = string_values(df.column(DATE_COLUMN)?)?;
    if let Some(pair) = dates.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(DataError::InvalidData(format!("duplicate date {}", pair[0])));
    }

    let keep: Vec<usize> = if start.is_some() || end.is_some() {
        let mut keep = Vec::with_capacity(dates.len());
        for (i, date) in dates.iter().enumerate() {
            let date = parse_date(date)?;
            if start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e) {
                keep.push(i);
            }
        }
        keep
    } else {
        (0..dates.len()).collect()
    };

    if keep.is_empty() {
        return Err(DataError::InvalidData(
            "no dates shared by all files in the requested range".to_string(),
        ));
    }

    let rf = float_values(df.column(RISK_FREE_COLUMN)?)?;
    let columns = (0..assets.len())
        .map(|i| float_values(df.column(&asset_column(i))?))
        .collect::<Result<Vec<_>>>()?;

    let risk_free = keep.iter().map(|&t| rf[t]).collect();
    let risky = keep
        .iter()
        .map(|&t| columns.iter().map(|column| column[t]).collect())
        .collect();

    Ok(LoadedReturns {
        dates: keep.iter().map(|&t| dates[t].clone()).collect(),
        assets: assets.iter().map(|path| asset_name(path)).collect(),
        series: ReturnSeries::from_rows(risk_free, risky)?,
    })
}

/// Read one `date,change` file, renaming `change` to `name`.
fn returns_frame(path: &Path, name: &str) -> Result<LazyFrame> {
    let df = read_csv(path)?;
    for column in [DATE_COLUMN, CHANGE_COLUMN] {
        if df.get_column_index(column).is_none() {
            return Err(DataError::InvalidData(format!(
                "{} has no '{column}' column",
                path.display()
            )));
        }
    }

    Ok(df.lazy().select([
        col(DATE_COLUMN).cast(DataType::String),
        col(CHANGE_COLUMN).cast(DataType::Float64).alias(name),
    ]))
}

fn asset_column(i: usize) -> String {
    format!("asset_{i}")
}

/// Values of a column as text. Missing values are an error.
pub(crate) fn string_values(column: &Column) -> Result<Vec<String>> {
    let cast = column.cast(&DataType::String)?;
    cast.as_materialized_series()
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| missing_value(column, row))
        })
        .collect()
}

/// Values of a column as `f64`. Missing values are an error.
pub(crate) fn float_values(column: &Column) -> Result<Vec<f64>> {
    let cast = column.cast(&DataType::Float64)?;
    cast.as_materialized_series()
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| missing_value(column, row)))
        .collect()
}

fn missing_value(column: &Column, row: usize) -> DataError {
    DataError::InvalidData(format!("column '{}' has a missing value at row {row}", column.name()))
}

/// Parse a date in `YYYY-MM-DD` or `YYYYMMDD` format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%Y%m%d"))
        .map_err(|e| DataError::InvalidDate(format!("{date_str}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::Datelike;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);

        assert_eq!(parse_date("20240115").unwrap(), date);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(matches!(parse_date("invalid"), Err(DataError::InvalidDate(_))));
    }

    #[test]
    fn test_asset_name() {
        assert_eq!(asset_name(Path::new("/data/clean/XLF.csv")), "XLF");
    }

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "date,change\n");
        write(dir.path(), "a.CSV", "date,change\n");
        write(dir.path(), "notes.txt", "ignored");

        let files = collect_files(&[dir.path().to_path_buf()], "csv").unwrap();
        let names: Vec<String> = files.iter().map(|p| asset_name(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_returns_inner_join_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let rf = write(
            dir.path(),
            "rf.csv",
            "date,change\n2020-01-03,0.01\n2020-01-01,0.01\n2020-01-02,0.02\n2020-01-04,0.01\n",
        );
        let a = write(
            dir.path(),
            "AAA.csv",
            "date,change\n2020-01-01,0.10\n2020-01-02,0.20\n2020-01-03,0.30\n",
        );
        let b = write(
            dir.path(),
            "BBB.csv",
            "date,change\n2020-01-02,-0.2\n2020-01-03,-0.3\n2020-01-04,-0.4\n",
        );

        let loaded = load_returns(&rf, &[a, b], None, None).unwrap();
        assert_eq!(loaded.dates, vec!["2020-01-02", "2020-01-03"]);
        assert_eq!(loaded.assets, vec!["AAA", "BBB"]);
        assert_eq!(loaded.series.n_periods(), 2);
        assert_eq!(loaded.series.n_assets(), 2);

        let series = &loaded.series;
        assert_abs_diff_eq!(series.risk_free()[0], 0.02);
        assert_abs_diff_eq!(series.risky()[[0, 0]], 0.20);
        assert_abs_diff_eq!(series.risky()[[1, 1]], -0.3);
    }

    #[test]
    fn test_load_returns_date_range() {
        let dir = tempfile::tempdir().unwrap();
        let body = "date,change\n2020-01-01,0.1\n2020-01-02,0.2\n2020-01-03,0.3\n2020-01-04,0.4\n";
        let rf = write(dir.path(), "rf.csv", body);
        let a = write(dir.path(), "AAA.csv", body);

        let start = parse_date("2020-01-02").ok();
        let end = parse_date("2020-01-03").ok();
        let loaded = load_returns(&rf, &[a.clone()], start, end).unwrap();
        assert_eq!(loaded.dates, vec!["2020-01-02", "2020-01-03"]);

        let late = parse_date("2021-01-01").ok();
        assert!(matches!(
            load_returns(&rf, &[a], late, None),
            Err(DataError::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_returns_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let rf = write(dir.path(), "rf.csv", "date,change\n2020-01-01,0.1\n");
        let bad = write(dir.path(), "bad.csv", "date,close\n2020-01-01,10.0\n");

        assert!(matches!(
            load_returns(&rf, &[bad], None, None),
            Err(DataError::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_returns_duplicate_dates() {
        let dir = tempfile::tempdir().unwrap();
        let rf = write(dir.path(), "rf.csv", "date,change\n2020-01-01,0.1\n2020-01-01,0.2\n");
        let a = write(dir.path(), "AAA.csv", "date,change\n2020-01-01,0.1\n");

        assert!(matches!(
            load_returns(&rf, &[a], None, None),
            Err(DataError::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_returns_requires_assets() {
        let dir = tempfile::tempdir().unwrap();
        let rf = write(dir.path(), "rf.csv", "date,change\n2020-01-01,0.1\n");
        assert!(load_returns(&rf, &[], None, None).is_err());
    }

    #[test]
    fn test_write_then_read_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = df! {
            DATE_COLUMN => &["2020-01-01", "2020-01-02"],
            CHANGE_COLUMN => &[0.5, -0.25],
        }
        .unwrap();

        write_csv(&path, &mut df).unwrap();
        let back = read_csv(&path).unwrap();
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(float_values(back.column(CHANGE_COLUMN).unwrap()).unwrap(), vec![0.5, -0.25]);
    }
}
