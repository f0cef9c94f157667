//! Bar store: the canonical, localized bar series the engine scans.
//!
//! Construction sorts ascending by `time_utc`, drops bars that fail
//! [`Bar::validate`], and collapses duplicate timestamps keep-last (the bar
//! supplied later wins). The store is immutable afterwards; a reload builds a
//! new store rather than patching this one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Bar;
use crate::time::ReferenceZone;

/// A bar plus its wall-clock time in the reference zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalBar {
    pub time_utc: DateTime<Utc>,
    pub time_local: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl LocalBar {
    pub fn local_date(&self) -> NaiveDate {
        self.time_local.date()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_local.time()
    }
}

/// What canonicalization removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub supplied: usize,
    pub invalid: usize,
    pub duplicates: usize,
    /// Kept bars whose open or close lies outside `[low, high]`.
    pub out_of_envelope: usize,
}

/// Sorted, deduplicated, localized bars.
#[derive(Debug, Clone)]
pub struct BarStore {
    zone: ReferenceZone,
    bars: Vec<LocalBar>,
    report: StoreReport,
}

impl BarStore {
    pub fn new(bars: impl IntoIterator<Item = Bar>, zone: ReferenceZone) -> Self {
        let mut report = StoreReport::default();
        let mut valid: Vec<Bar> = Vec::new();

        for bar in bars {
            report.supplied += 1;
            match bar.validate() {
                Ok(()) => {
                    if !bar.is_sane() {
                        report.out_of_envelope += 1;
                    }
                    valid.push(bar);
                }
                Err(e) => {
                    report.invalid += 1;
                    warn!(error = %e, "dropping invalid bar");
                }
            }
        }

        // Stable sort keeps supply order among equal timestamps, so replacing
        // on collision below is keep-last.
        valid.sort_by_key(|b| b.time_utc);

        let mut canonical: Vec<LocalBar> = Vec::with_capacity(valid.len());
        for bar in valid {
            let local = LocalBar {
                time_utc: bar.time_utc,
                time_local: zone.localize(bar.time_utc),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
            };
            match canonical.last_mut() {
                Some(last) if last.time_utc == local.time_utc => {
                    report.duplicates += 1;
                    *last = local;
                }
                _ => canonical.push(local),
            }
        }

        if report.out_of_envelope > 0 {
            debug!(
                bars = report.out_of_envelope,
                "kept bars with open/close outside high/low"
            );
        }
        if report.duplicates > 0 {
            warn!(
                duplicates = report.duplicates,
                "collapsed duplicate bar timestamps (kept last)"
            );
        }
        debug!(
            supplied = report.supplied,
            kept = canonical.len(),
            zone = %zone,
            "bar store built"
        );

        Self {
            zone,
            bars: canonical,
            report,
        }
    }

    pub fn empty(zone: ReferenceZone) -> Self {
        Self {
            zone,
            bars: Vec::new(),
            report: StoreReport::default(),
        }
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    pub fn bars(&self) -> &[LocalBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn report(&self) -> StoreReport {
        self.report
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.time_utc)
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.time_utc)
    }

    /// Index of the first bar strictly after `instant` (`len()` if none).
    pub fn first_after(&self, instant: DateTime<Utc>) -> usize {
        self.bars.partition_point(|b| b.time_utc <= instant)
    }

    /// Bars strictly after `instant`.
    pub fn after(&self, instant: DateTime<Utc>) -> &[LocalBar] {
        &self.bars[self.first_after(instant)..]
    }

    /// A new store holding only bars at or after `cutoff`.
    pub fn since(&self, cutoff: DateTime<Utc>) -> Self {
        let start = self.bars.partition_point(|b| b.time_utc < cutoff);
        Self {
            zone: self.zone,
            bars: self.bars[start..].to_vec(),
            report: self.report,
        }
    }

    /// Distinct local dates, ascending.
    pub fn local_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.bars.iter().map(LocalBar::local_date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}
