//! Reference timezone conversions.
//!
//! Every bar is localized through [`ReferenceZone::localize`] and every
//! session boundary goes back to UTC through [`ReferenceZone::to_utc`]; nothing
//! else in the crate touches timezone math.
//!
//! Local -> UTC resolution is deterministic across DST transitions:
//! - ambiguous wall times (fall back) resolve to the earliest instant, or the
//!   latest through [`ReferenceZone::to_utc_latest`] (used for window ends so
//!   the repeated hour stays inside the session)
//! - nonexistent wall times (spring forward) shift forward one minute at a
//!   time, capped at two hours, to the first valid instant

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

const MAX_GAP_SHIFT_MINUTES: i64 = 120;

/// The fixed civil timezone session windows are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone(Tz);

impl ReferenceZone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// US Eastern, the zone session times are quoted in by default.
    pub fn new_york() -> Self {
        Self::new(chrono_tz::America::New_York)
    }

    /// Parse an IANA name such as "America/New_York".
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse::<Tz>().ok().map(Self)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// UTC instant -> wall-clock time in this zone.
    pub fn localize(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.0).naive_local()
    }

    /// Wall-clock time in this zone -> UTC instant.
    ///
    /// Returns `None` only if a DST gap is wider than the shift cap.
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.resolve(local, false)
    }

    /// Like [`to_utc`](Self::to_utc), but an ambiguous wall time maps to its
    /// second occurrence.
    pub fn to_utc_latest(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.resolve(local, true)
    }

    fn resolve(&self, local: NaiveDateTime, latest: bool) -> Option<DateTime<Utc>> {
        match self.0.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, last) => {
                let dt = if latest { last } else { earliest };
                Some(dt.with_timezone(&Utc))
            }
            LocalResult::None => (1..=MAX_GAP_SHIFT_MINUTES).find_map(|m| {
                self.0
                    .from_local_datetime(&(local + Duration::minutes(m)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
        }
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::new_york()
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name())
    }
}
