//! Build fingerprinting and caller-owned memoization.
//!
//! - `BuildFingerprint`: cheap BLAKE3 digest of what `engine::build` depends on
//!   (bar count, first/last bar, reference zone, enabled definitions, options).
//! - `RangeCache`: holds the last result and rebuilds only when the
//!   fingerprint changes.
//!
//! The fingerprint samples the store's edges rather than hashing every bar, so
//! a provider that rewrites a bar in the middle of an otherwise identical
//! series must call [`RangeCache::invalidate`].

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::data::BarStore;
use crate::domain::{SessionDefinition, SessionRange};
use crate::engine::{build, BuildOptions};

/// Hex BLAKE3 digest identifying one engine input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildFingerprint(pub String);

impl BuildFingerprint {
    pub fn compute(
        store: &BarStore,
        definitions: &[SessionDefinition],
        options: &BuildOptions,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();

        hasher.update(&(store.len() as u64).to_le_bytes());
        for bar in [store.bars().first(), store.bars().last()].into_iter().flatten() {
            hasher.update(&bar.time_utc.timestamp_millis().to_le_bytes());
            hasher.update(&bar.high.to_bits().to_le_bytes());
            hasher.update(&bar.low.to_bits().to_le_bytes());
            hasher.update(&bar.close.to_bits().to_le_bytes());
        }
        hasher.update(store.zone().name().as_bytes());

        for def in definitions.iter().filter(|d| d.enabled) {
            hasher.update(&(def.key.len() as u64).to_le_bytes());
            hasher.update(def.key.as_bytes());
            hasher.update(&def.start.num_seconds_from_midnight().to_le_bytes());
            hasher.update(&def.end.num_seconds_from_midnight().to_le_bytes());
        }

        match options.lookback_days {
            Some(days) => {
                hasher.update(&[1]);
                hasher.update(&days.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }

        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for BuildFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memoizes `engine::build` on its fingerprint.
#[derive(Debug, Default)]
pub struct RangeCache {
    fingerprint: Option<BuildFingerprint>,
    ranges: Vec<SessionRange>,
    rebuilds: u64,
}

impl RangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached ranges if the inputs are unchanged, otherwise a fresh build.
    ///
    /// A fresh build fully replaces the previous result.
    pub fn get_or_build(
        &mut self,
        store: &BarStore,
        definitions: &[SessionDefinition],
        options: &BuildOptions,
    ) -> &[SessionRange] {
        let fingerprint = BuildFingerprint::compute(store, definitions, options);
        if self.fingerprint.as_ref() != Some(&fingerprint) {
            self.ranges = build(store, definitions, options);
            self.rebuilds += 1;
            debug!(%fingerprint, rebuilds = self.rebuilds, "range cache rebuilt");
            self.fingerprint = Some(fingerprint);
        }
        &self.ranges
    }

    /// Force the next `get_or_build` to rebuild.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }

    pub fn fingerprint(&self) -> Option<&BuildFingerprint> {
        self.fingerprint.as_ref()
    }

    pub fn ranges(&self) -> &[SessionRange] {
        &self.ranges
    }

    /// Number of builds performed so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ny_bar, store_of};

    fn sample_store() -> BarStore {
        store_of(vec![
            ny_bar(2024, 1, 2, 9, 0, 110.0, 100.0, 105.0),
            ny_bar(2024, 1, 2, 11, 0, 113.0, 108.0, 112.0),
        ])
    }

    fn defs() -> Vec<SessionDefinition> {
        vec![SessionDefinition::morning(), SessionDefinition::afternoon()]
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let store = sample_store();
        let a = BuildFingerprint::compute(&store, &defs(), &BuildOptions::default());
        let b = BuildFingerprint::compute(&store, &defs(), &BuildOptions::default());
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn fingerprint_changes_with_new_bar() {
        let store = sample_store();
        let mut bars: Vec<_> = vec![
            ny_bar(2024, 1, 2, 9, 0, 110.0, 100.0, 105.0),
            ny_bar(2024, 1, 2, 11, 0, 113.0, 108.0, 112.0),
        ];
        bars.push(ny_bar(2024, 1, 2, 12, 0, 113.0, 108.0, 109.0));
        let grown = store_of(bars);
        assert_ne!(
            BuildFingerprint::compute(&store, &defs(), &BuildOptions::default()),
            BuildFingerprint::compute(&grown, &defs(), &BuildOptions::default())
        );
    }

    #[test]
    fn fingerprint_changes_with_definitions_and_options() {
        let store = sample_store();
        let base = BuildFingerprint::compute(&store, &defs(), &BuildOptions::default());

        let mut disabled = defs();
        disabled[1].enabled = false;
        assert_ne!(base, BuildFingerprint::compute(&store, &disabled, &BuildOptions::default()));

        let options = BuildOptions {
            lookback_days: Some(3),
        };
        assert_ne!(base, BuildFingerprint::compute(&store, &defs(), &options));
    }

    #[test]
    fn fingerprint_ignores_presentation_fields() {
        let store = sample_store();
        let mut relabelled = defs();
        relabelled[0].label = "AM".into();
        relabelled[0].color = Some("gold".into());
        assert_eq!(
            BuildFingerprint::compute(&store, &defs(), &BuildOptions::default()),
            BuildFingerprint::compute(&store, &relabelled, &BuildOptions::default())
        );
    }

    #[test]
    fn cache_rebuilds_only_on_change() {
        let store = sample_store();
        let mut cache = RangeCache::new();

        let first = cache.get_or_build(&store, &defs(), &BuildOptions::default()).to_vec();
        assert_eq!(cache.rebuilds(), 1);
        let second = cache.get_or_build(&store, &defs(), &BuildOptions::default()).to_vec();
        assert_eq!(cache.rebuilds(), 1);
        assert_eq!(first, second);

        cache.invalidate();
        cache.get_or_build(&store, &defs(), &BuildOptions::default());
        assert_eq!(cache.rebuilds(), 2);

        let empty = store_of(Vec::new());
        assert!(cache
            .get_or_build(&empty, &defs(), &BuildOptions::default())
            .is_empty());
        assert_eq!(cache.rebuilds(), 3);
    }
}
