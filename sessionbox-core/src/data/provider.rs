//! History provider trait and structured error types.
//!
//! `BarProvider` abstracts over where bars come from (CSV import, an embedding
//! chart host, test fixtures) so the engine never depends on a concrete feed.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognized timestamp '{value}' (expected RFC 3339 or unix seconds)")]
    BadTimestamp { row: usize, value: String },
}

/// Source of time-ascending OHLC bars.
pub trait BarProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Bars with `time_utc >= since`. Order is not required; the store sorts.
    fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<Bar>, DataError>;
}

/// Provider over a bar vector already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: Vec<Bar>,
}

impl InMemoryProvider {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }
}

impl BarProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<Bar>, DataError> {
        Ok(self
            .bars
            .iter()
            .filter(|b| b.time_utc >= since)
            .cloned()
            .collect())
    }
}
