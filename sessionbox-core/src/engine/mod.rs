//! Session range engine.
//!
//! Data flows one way:
//! `BarStore -> build_ranges -> detect_all -> select_for_display -> DisplayBox`
//!
//! [`build`] is pure: same store and definitions in, identical ranges out.
//! Callers that re-render often should memoize it through
//! [`crate::fingerprint::RangeCache`] rather than calling it every tick.

pub mod builder;
pub mod detector;
pub mod display;
pub mod selection;

pub use builder::build_ranges;
pub use detector::{detect, detect_all};
pub use display::{compose_display, retracement_levels, BoxTone, DisplayBox, RetracementLevel};
pub use selection::{select_for_display, SelectionCaps};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::BarStore;
use crate::domain::{SessionDefinition, SessionRange};

/// Knobs that change which ranges are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Build boxes only for the N most recent local dates present in the store.
    /// Breakout and mitigation scans still see every bar.
    pub lookback_days: Option<u32>,
}

/// Counts by terminal state, for logging and CLI summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub total: usize,
    pub open: usize,
    pub broken: usize,
    pub mitigated: usize,
}

impl RangeSummary {
    pub fn of(ranges: &[SessionRange]) -> Self {
        let mut summary = Self {
            total: ranges.len(),
            ..Self::default()
        };
        for r in ranges {
            if r.mitigated() {
                summary.mitigated += 1;
            } else if r.direction().is_some() {
                summary.broken += 1;
            } else {
                summary.open += 1;
            }
        }
        summary
    }
}

/// Build every range and classify its breakout/mitigation state.
pub fn build(
    store: &BarStore,
    definitions: &[SessionDefinition],
    options: &BuildOptions,
) -> Vec<SessionRange> {
    let mut ranges = build_ranges(store, definitions, options);
    detect_all(&mut ranges, store);

    let summary = RangeSummary::of(&ranges);
    debug!(
        bars = store.len(),
        ranges = summary.total,
        open = summary.open,
        broken = summary.broken,
        mitigated = summary.mitigated,
        "session ranges built"
    );
    ranges
}
