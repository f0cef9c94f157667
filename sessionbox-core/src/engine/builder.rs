//! Session range builder.
//!
//! One pass over the store. Each bar is tested against every enabled window by
//! local time-of-day and folded into the `(local date, key)` bucket it falls
//! in. Buckets exist only once a bar lands in them, so there are no empty boxes.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

use crate::data::BarStore;
use crate::domain::{SessionDefinition, SessionRange};

use super::BuildOptions;

#[derive(Debug, Clone, Copy)]
struct Extent {
    high: f64,
    low: f64,
    bars: usize,
}

impl Extent {
    fn new(high: f64, low: f64) -> Self {
        Self { high, low, bars: 1 }
    }

    fn absorb(&mut self, high: f64, low: f64) {
        self.high = self.high.max(high);
        self.low = self.low.min(low);
        self.bars += 1;
    }
}

/// Earliest local date boxes are built for, given `lookback_days`.
fn lookback_cutoff(store: &BarStore, options: &BuildOptions) -> Option<NaiveDate> {
    let days = options.lookback_days? as usize;
    let dates = store.local_dates();
    if days == 0 || dates.len() <= days {
        return None;
    }
    dates.get(dates.len() - days).copied()
}

/// Build one open `SessionRange` per populated `(local date, enabled key)`.
///
/// Disabled, empty, and repeated-key definitions are skipped; for a repeated
/// key the first definition wins. Output is ordered by date ascending, then key ascending.
pub fn build_ranges(
    store: &BarStore,
    definitions: &[SessionDefinition],
    options: &BuildOptions,
) -> Vec<SessionRange> {
    let mut active: Vec<&SessionDefinition> = Vec::new();
    for def in definitions.iter().filter(|d| d.enabled) {
        if !def.is_valid() {
            warn!(key = %def.key, start = %def.start, end = %def.end, "skipping empty session window");
            continue;
        }
        if active.iter().any(|a| a.key == def.key) {
            warn!(key = %def.key, "duplicate session key; keeping the first definition");
            continue;
        }
        active.push(def);
    }

    if active.is_empty() || store.is_empty() {
        return Vec::new();
    }

    let cutoff = lookback_cutoff(store, options);
    let mut buckets: BTreeMap<(NaiveDate, &str), Extent> = BTreeMap::new();

    for bar in store.bars() {
        let date = bar.local_date();
        if cutoff.is_some_and(|c| date < c) {
            continue;
        }
        let tod = bar.time_of_day();
        for def in &active {
            if !def.contains(tod) {
                continue;
            }
            buckets
                .entry((date, def.key.as_str()))
                .and_modify(|e| e.absorb(bar.high, bar.low))
                .or_insert_with(|| Extent::new(bar.high, bar.low));
        }
    }

    let zone = store.zone();
    let mut ranges = Vec::with_capacity(buckets.len());
    for ((date, key), extent) in buckets {
        let Some(def) = active.iter().find(|d| d.key == key) else {
            continue;
        };
        let (Some(start_utc), Some(end_utc)) = (
            zone.to_utc(date.and_time(def.start)),
            zone.to_utc_latest(date.and_time(def.end)),
        ) else {
            warn!(%date, key, "session boundary has no UTC instant; skipping");
            continue;
        };
        let mut range = SessionRange::new(date, key, extent.high, extent.low, start_utc, end_utc);
        range.bar_count = extent.bars;
        ranges.push(range);
    }
    ranges
}
