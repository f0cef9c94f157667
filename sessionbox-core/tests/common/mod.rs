#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use sessionbox_core::{Bar, BarStore, ReferenceZone};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn ny_time(y: i32, m: u32, day: u32, h: u32, min: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(y, m, day, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Hourly bar at a New York wall-clock hour on 2024-01-`day`.
pub fn jan_bar(day: u32, hour: u32, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(ny_time(2024, 1, day, hour, 0), close, high, low, close)
}

pub fn store_of(bars: Vec<Bar>) -> BarStore {
    BarStore::new(bars, ReferenceZone::new_york())
}
