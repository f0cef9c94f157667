//! CSV bar import.
//!
//! Expected header: `time,open,high,low,close` (extra columns such as `volume`
//! are ignored). `time` is either RFC 3339 with an offset or unix seconds.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::data::provider::{BarProvider, DataError};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Reads bars from a CSV file on every `fetch`.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BarProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<Bar>, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|source| DataError::Io {
            path: self.path.clone(),
            source,
        })?;
        let bars = read_bars(file)?;
        Ok(bars.into_iter().filter(|b| b.time_utc >= since).collect())
    }
}

/// Parse every row of a CSV stream into bars.
pub fn read_bars(reader: impl Read) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        // Row numbers are 1-based and skip the header line.
        let time_utc = parse_time(&row.time).ok_or_else(|| DataError::BadTimestamp {
            row: i + 1,
            value: row.time.clone(),
        })?;
        bars.push(Bar::new(time_utc, row.open, row.high, row.low, row.close));
    }
    Ok(bars)
}

/// RFC 3339 with offset, or integer unix seconds.
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
