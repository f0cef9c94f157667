//! SessionRange — the computed box for one (calendar day, session) pair.
//!
//! The lifecycle is `Open -> Broken -> Mitigated`, one-way. It is stored as a
//! single enum so that the flag combinations the renderer reads
//! (`broke_above`, `broke_below`, `mitigated`) can never contradict each other.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the range the breakout close landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakDirection {
    Above,
    Below,
}

impl BreakDirection {
    /// Classify a close against `[low, high]`. Closes equal to a boundary are inside.
    pub fn classify(close: f64, low: f64, high: f64) -> Option<Self> {
        if close > high {
            Some(Self::Above)
        } else if close < low {
            Some(Self::Below)
        } else {
            None
        }
    }

    /// True if `close` has crossed back through the boundary opposite the breakout.
    pub fn is_mitigated_by(self, close: f64, low: f64, high: f64) -> bool {
        match self {
            Self::Above => close < low,
            Self::Below => close > high,
        }
    }
}

/// Detection state of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RangeState {
    /// No close outside the range since the session ended.
    Open,
    /// Broke out, not yet mitigated.
    Broken {
        direction: BreakDirection,
        at: DateTime<Utc>,
    },
    /// Terminal.
    Mitigated {
        direction: BreakDirection,
        broke_at: DateTime<Utc>,
        mitigated_at: DateTime<Utc>,
    },
}

/// Computed range for one (local date, session key) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRange {
    pub date: NaiveDate,
    pub key: String,
    pub high: f64,
    pub low: f64,
    /// `date + start` in the reference zone, as UTC.
    pub start_utc: DateTime<Utc>,
    /// `date + end` in the reference zone, as UTC.
    pub end_utc: DateTime<Utc>,
    /// Number of bars that contributed to the extent.
    pub bar_count: usize,
    pub state: RangeState,
}

impl SessionRange {
    pub fn new(
        date: NaiveDate,
        key: impl Into<String>,
        high: f64,
        low: f64,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            key: key.into(),
            high,
            low,
            start_utc,
            end_utc,
            bar_count: 0,
            state: RangeState::Open,
        }
    }

    pub fn direction(&self) -> Option<BreakDirection> {
        match self.state {
            RangeState::Open => None,
            RangeState::Broken { direction, .. } | RangeState::Mitigated { direction, .. } => {
                Some(direction)
            }
        }
    }

    pub fn broke_above(&self) -> bool {
        self.direction() == Some(BreakDirection::Above)
    }

    pub fn broke_below(&self) -> bool {
        self.direction() == Some(BreakDirection::Below)
    }

    pub fn break_utc(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RangeState::Open => None,
            RangeState::Broken { at, .. } => Some(at),
            RangeState::Mitigated { broke_at, .. } => Some(broke_at),
        }
    }

    pub fn mitigated(&self) -> bool {
        matches!(self.state, RangeState::Mitigated { .. })
    }

    pub fn mitigation_utc(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RangeState::Mitigated { mitigated_at, .. } => Some(mitigated_at),
            _ => None,
        }
    }

    /// `high - low`.
    pub fn height(&self) -> f64 {
        self.high - self.low
    }

    /// `Open -> Broken`. Ignored unless the range is still open.
    pub fn record_breakout(&mut self, direction: BreakDirection, at: DateTime<Utc>) {
        if self.state == RangeState::Open {
            self.state = RangeState::Broken { direction, at };
        }
    }

    /// `Broken -> Mitigated`. Ignored unless broken and `at` is after the breakout.
    pub fn record_mitigation(&mut self, at: DateTime<Utc>) {
        if let RangeState::Broken {
            direction,
            at: broke_at,
        } = self.state
        {
            if at > broke_at {
                self.state = RangeState::Mitigated {
                    direction,
                    broke_at,
                    mitigated_at: at,
                };
            }
        }
    }
}
