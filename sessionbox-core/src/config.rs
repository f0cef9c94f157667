//! Engine configuration (TOML).
//!
//! ```toml
//! timezone = "America/New_York"
//! lookback_days = 10
//! max_unmitigated = 5
//! max_mitigated = 5
//!
//! [retracements]
//! enabled = true
//! levels = [0.3, 0.5, 0.7]
//!
//! [[sessions]]
//! key = "Morning"
//! label = "9"
//! start = "09:00:00"
//! end = "10:00:00"
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::SessionDefinition;
use crate::engine::{BuildOptions, SelectionCaps};
use crate::time::ReferenceZone;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("session '{key}' window is empty or crosses midnight: start {start} must be before end {end}")]
    InvalidWindow {
        key: String,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("duplicate session key '{0}'")]
    DuplicateSessionKey(String),

    #[error("session key must not be empty")]
    EmptySessionKey,

    #[error("retracement level {0} is outside [0, 1]")]
    InvalidRetracement(f64),

    #[error("lookback_days must be at least 1")]
    ZeroLookback,
}

/// Which retracement levels to report inside each box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetracementConfig {
    pub enabled: bool,
    /// Fractions of the box height measured down from the high.
    pub levels: Vec<f64>,
}

impl Default for RetracementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            levels: vec![0.3, 0.5, 0.7],
        }
    }
}

impl RetracementConfig {
    /// Levels in effect (empty when disabled).
    pub fn active_levels(&self) -> &[f64] {
        if self.enabled {
            &self.levels
        } else {
            &[]
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA name of the reference zone session times are quoted in.
    pub timezone: String,
    /// Days of history to request, and the number of most recent local dates
    /// boxes are built for.
    pub lookback_days: u32,
    pub max_unmitigated: usize,
    pub max_mitigated: usize,
    pub retracements: RetracementConfig,
    pub sessions: Vec<SessionDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: ReferenceZone::new_york().name().to_string(),
            lookback_days: 10,
            max_unmitigated: 5,
            max_mitigated: 5,
            retracements: RetracementConfig::default(),
            sessions: vec![SessionDefinition::morning(), SessionDefinition::afternoon()],
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject configurations the builder would silently no-op on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone()?;
        if self.lookback_days == 0 {
            return Err(ConfigError::ZeroLookback);
        }

        let mut seen = HashSet::new();
        for def in &self.sessions {
            if def.key.trim().is_empty() {
                return Err(ConfigError::EmptySessionKey);
            }
            if !seen.insert(def.key.as_str()) {
                return Err(ConfigError::DuplicateSessionKey(def.key.clone()));
            }
            if !def.is_valid() {
                return Err(ConfigError::InvalidWindow {
                    key: def.key.clone(),
                    start: def.start,
                    end: def.end,
                });
            }
        }

        if let Some(&bad) = self
            .retracements
            .levels
            .iter()
            .find(|l| !(0.0..=1.0).contains(*l))
        {
            return Err(ConfigError::InvalidRetracement(bad));
        }

        Ok(())
    }

    pub fn zone(&self) -> Result<ReferenceZone, ConfigError> {
        ReferenceZone::from_name(&self.timezone)
            .ok_or_else(|| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            lookback_days: Some(self.lookback_days),
        }
    }

    pub fn selection_caps(&self) -> SelectionCaps {
        SelectionCaps {
            max_unmitigated: self.max_unmitigated,
            max_mitigated: self.max_mitigated,
        }
    }

    pub fn session(&self, key: &str) -> Option<&SessionDefinition> {
        self.sessions.iter().find(|s| s.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sessions.len(), 2);
        assert_eq!(config.lookback_days, 10);
        assert_eq!(config.selection_caps().max_unmitigated, 5);
        assert_eq!(config.zone().unwrap(), ReferenceZone::new_york());
    }

    #[test]
    fn default_config_survives_toml() {
        let config = EngineConfig::default();
        let toml = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_toml("max_mitigated = 2\n").unwrap();
        assert_eq!(config.max_mitigated, 2);
        assert_eq!(config.max_unmitigated, 5);
        assert_eq!(config.sessions.len(), 2);
    }

    #[test]
    fn parses_custom_sessions() {
        let toml = r#"
timezone = "Europe/London"
lookback_days = 3

[[sessions]]
key = "London"
label = "L"
start = "08:00:00"
end = "09:30:00"

[[sessions]]
key = "Lunch"
start = "12:00:00"
end = "13:00:00"
enabled = false
"#;
        let config = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(config.sessions.len(), 2);
        assert_eq!(config.sessions[0].end, t(9, 30));
        assert!(!config.sessions[1].enabled);
        assert_eq!(config.zone().unwrap().name(), "Europe/London");
        assert_eq!(config.build_options().lookback_days, Some(3));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = EngineConfig::from_toml("timezone = \"Nowhere/Special\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTimezone(ref tz) if tz == "Nowhere/Special"));
    }

    #[test]
    fn rejects_window_crossing_midnight() {
        let mut config = EngineConfig::default();
        config.sessions = vec![SessionDefinition::new("Overnight", t(22, 0), t(2, 0))];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindow { ref key, .. }) if key == "Overnight"
        ));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut config = EngineConfig::default();
        config.sessions.push(SessionDefinition::morning());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSessionKey(ref k)) if k == "Morning"
        ));
    }

    #[test]
    fn rejects_empty_key() {
        let mut config = EngineConfig::default();
        config.sessions = vec![SessionDefinition::new("  ", t(9, 0), t(10, 0))];
        assert!(matches!(config.validate(), Err(ConfigError::EmptySessionKey)));
    }

    #[test]
    fn rejects_out_of_range_retracement() {
        let mut config = EngineConfig::default();
        config.retracements.levels.push(1.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRetracement(l)) if l == 1.5
        ));
    }

    #[test]
    fn rejects_zero_lookback() {
        let err = EngineConfig::from_toml("lookback_days = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLookback));
    }

    #[test]
    fn disabled_retracements_report_no_levels() {
        let mut config = RetracementConfig::default();
        assert_eq!(config.active_levels().len(), 3);
        config.enabled = false;
        assert!(config.active_levels().is_empty());
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = EngineConfig::from_file(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
