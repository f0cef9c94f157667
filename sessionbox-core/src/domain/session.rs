//! Session definitions — recurring daily local-time windows.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A recurring daily window `[start, end)` on the reference-zone clock.
///
/// Windows never cross local midnight: `start < end` is checked by
/// `EngineConfig::validate`, and the builder skips definitions that break it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefinition {
    /// Unique identifier, e.g. "Morning".
    pub key: String,
    /// Short text drawn next to the box, e.g. "9".
    #[serde(default)]
    pub label: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Presentation hint for boxes that have not broken out yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl SessionDefinition {
    pub fn new(key: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            start,
            end,
            enabled: true,
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The 09:00–10:00 window labelled "9".
    pub fn morning() -> Self {
        Self::new("Morning", hm(9, 0), hm(10, 0))
            .with_label("9")
            .with_color("limegreen")
    }

    /// The 15:00–16:00 window labelled "3".
    pub fn afternoon() -> Self {
        Self::new("Afternoon", hm(15, 0), hm(16, 0))
            .with_label("3")
            .with_color("cornflowerblue")
    }

    /// Non-empty and does not wrap midnight.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open membership test on a local time-of-day.
    pub fn contains(&self, time_of_day: NaiveTime) -> bool {
        time_of_day >= self.start && time_of_day < self.end
    }

    /// Window length in whole minutes (zero for invalid windows).
    pub fn duration_minutes(&self) -> u32 {
        if !self.is_valid() {
            return 0;
        }
        let start = self.start.num_seconds_from_midnight();
        let end = self.end.num_seconds_from_midnight();
        (end - start) / 60
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
