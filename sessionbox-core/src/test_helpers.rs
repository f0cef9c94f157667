//! Shared fixtures for unit tests: bars stamped on the New York clock.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;

use crate::data::BarStore;
use crate::domain::Bar;
use crate::time::ReferenceZone;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// UTC instant of a New York wall-clock time.
pub fn ny_time(y: i32, m: u32, day: u32, h: u32, min: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(y, m, day, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Bar opening at a New York wall-clock time; open is set to close.
#[allow(clippy::too_many_arguments)]
pub fn ny_bar(
    y: i32,
    m: u32,
    day: u32,
    h: u32,
    min: u32,
    high: f64,
    low: f64,
    close: f64,
) -> Bar {
    Bar::new(ny_time(y, m, day, h, min), close, high, low, close)
}

pub fn store_of(bars: Vec<Bar>) -> BarStore {
    BarStore::new(bars, ReferenceZone::new_york())
}
