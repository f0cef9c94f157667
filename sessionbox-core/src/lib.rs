//! Sessionbox Core — recurring session ranges and their breakout/mitigation state.
//!
//! This crate contains:
//! - Domain types (bars, session definitions, session ranges)
//! - Reference-timezone conversion
//! - The canonical bar store and history providers (CSV, in-memory)
//! - The engine: range builder, breakout/mitigation detector, display selection
//! - Build fingerprinting with a caller-owned memo cache
//! - TOML configuration with validation

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod time;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ConfigError, EngineConfig, RetracementConfig};
pub use data::{BarProvider, BarStore, DataError};
pub use domain::{Bar, BreakDirection, RangeState, SessionDefinition, SessionRange};
pub use engine::{build, compose_display, select_for_display, BuildOptions, DisplayBox, SelectionCaps};
pub use fingerprint::{BuildFingerprint, RangeCache};
pub use time::ReferenceZone;
