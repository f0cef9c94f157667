//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-interval OHLC bar, stamped at its open instant.
///
/// Bars arrive from a history provider already in UTC. Localization to the
/// reference timezone happens once, when the bar store is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time_utc: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Reasons a bar is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar at {time} has a non-finite price")]
    NonFinite { time: DateTime<Utc> },

    #[error("bar at {time} has low {low} above high {high}")]
    InvertedRange {
        time: DateTime<Utc>,
        low: f64,
        high: f64,
    },
}

impl Bar {
    pub fn new(time_utc: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time_utc,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if any OHLC field is NaN or infinite (void bar).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, and open/close inside [low, high].
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.open >= self.low
            && self.open <= self.high
            && self.close >= self.low
            && self.close <= self.high
    }

    /// Minimum the engine needs: finite prices and `low <= high`.
    ///
    /// Open/close outside the high/low envelope is tolerated; some feeds
    /// report closes a tick beyond the bar extremes.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.is_void() {
            return Err(BarError::NonFinite {
                time: self.time_utc,
            });
        }
        if self.low > self.high {
            return Err(BarError::InvertedRange {
                time: self.time_utc,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}
