//! Display boxes: the renderer-facing view of selected ranges.
//!
//! Pure data. Coordinate mapping and styling stay with the host chart.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{BreakDirection, SessionRange};

use super::selection::select_for_display;

/// Color class of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxTone {
    Bullish,
    Bearish,
    /// No breakout yet; the renderer uses the session's own color.
    Neutral,
}

impl From<Option<BreakDirection>> for BoxTone {
    fn from(direction: Option<BreakDirection>) -> Self {
        match direction {
            Some(BreakDirection::Above) => Self::Bullish,
            Some(BreakDirection::Below) => Self::Bearish,
            None => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetracementLevel {
    pub pct: f64,
    pub price: f64,
}

/// One rectangle plus its retracement lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayBox {
    pub date: NaiveDate,
    pub key: String,
    pub label: String,
    pub color: Option<String>,
    pub start_utc: DateTime<Utc>,
    /// Mitigation instant, or the chart's right edge while unmitigated.
    pub end_utc: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub tone: BoxTone,
    pub mitigated: bool,
    pub retracements: Vec<RetracementLevel>,
}

/// Prices `high - pct * (high - low)` for each level.
pub fn retracement_levels(range: &SessionRange, levels: &[f64]) -> Vec<RetracementLevel> {
    let height = range.height();
    levels
        .iter()
        .map(|&pct| RetracementLevel {
            pct,
            price: range.high - pct * height,
        })
        .collect()
}

impl DisplayBox {
    pub fn from_range(
        range: &SessionRange,
        config: &EngineConfig,
        right_edge: DateTime<Utc>,
    ) -> Self {
        let session = config.session(&range.key);
        let label = session
            .map(|s| s.label.as_str())
            .filter(|l| !l.is_empty())
            .unwrap_or(range.key.as_str())
            .to_string();

        Self {
            date: range.date,
            key: range.key.clone(),
            label,
            color: session.and_then(|s| s.color.clone()),
            start_utc: range.start_utc,
            end_utc: range.mitigation_utc().unwrap_or(right_edge),
            high: range.high,
            low: range.low,
            tone: range.direction().into(),
            mitigated: range.mitigated(),
            retracements: retracement_levels(range, config.retracements.active_levels()),
        }
    }
}

/// Select per the configured caps and map to boxes, in chronological order.
pub fn compose_display(
    ranges: &[SessionRange],
    config: &EngineConfig,
    right_edge: DateTime<Utc>,
) -> Vec<DisplayBox> {
    select_for_display(ranges, config.selection_caps())
        .into_iter()
        .map(|r| DisplayBox::from_range(r, config, right_edge))
        .collect()
}
