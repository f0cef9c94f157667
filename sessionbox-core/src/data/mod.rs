//! Data layer: history providers, CSV import, and the canonical bar store.

pub mod csv_import;
pub mod provider;
pub mod store;

pub use csv_import::{read_bars, CsvProvider};
pub use provider::{BarProvider, DataError, InMemoryProvider};
pub use store::{BarStore, LocalBar, StoreReport};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::domain::Bar;
use crate::time::ReferenceZone;

fn lookback_start(right_edge: DateTime<Utc>, lookback_days: u32) -> DateTime<Utc> {
    right_edge - Duration::days(i64::from(lookback_days))
}

/// Request `lookback_days` of history ending at `now` and build a store from it.
///
/// Bars stamped after `now` are left out.
pub fn load_store(
    provider: &dyn BarProvider,
    lookback_days: u32,
    now: DateTime<Utc>,
    zone: ReferenceZone,
) -> Result<BarStore, DataError> {
    let since = lookback_start(now, lookback_days);
    let fetched = provider.fetch(since)?;
    let supplied = fetched.len();
    let bars: Vec<Bar> = fetched.into_iter().filter(|b| b.time_utc <= now).collect();
    info!(
        provider = provider.name(),
        fetched = supplied,
        after_now = supplied - bars.len(),
        %since,
        "loaded bar history"
    );
    Ok(BarStore::new(bars, zone))
}

/// Load everything the provider has, anchor the lookback window on the last
/// bar, and return the windowed store with that anchor.
///
/// `None` when the provider has no valid bars.
pub fn load_latest(
    provider: &dyn BarProvider,
    lookback_days: u32,
    zone: ReferenceZone,
) -> Result<Option<(BarStore, DateTime<Utc>)>, DataError> {
    let full = BarStore::new(provider.fetch(DateTime::<Utc>::MIN_UTC)?, zone);
    let Some(right_edge) = full.last_time() else {
        info!(provider = provider.name(), "provider returned no usable bars");
        return Ok(None);
    };
    let since = lookback_start(right_edge, lookback_days);
    let store = full.since(since);
    info!(
        provider = provider.name(),
        kept = store.len(),
        %since,
        %right_edge,
        "loaded latest bar history"
    );
    Ok(Some((store, right_edge)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn load_store_requests_lookback_window() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let old = Bar::new(now - Duration::days(15), 1.0, 2.0, 0.5, 1.0);
        let recent = Bar::new(now - Duration::days(3), 1.0, 2.0, 0.5, 1.0);
        let provider = InMemoryProvider::new(vec![old, recent.clone()]);

        let store = load_store(&provider, 10, now, ReferenceZone::new_york()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.first_time(), Some(recent.time_utc));
    }

    #[test]
    fn load_store_drops_bars_after_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let before = Bar::new(now - Duration::hours(1), 1.0, 2.0, 0.5, 1.0);
        let at_now = Bar::new(now, 1.0, 2.0, 0.5, 1.0);
        let later = Bar::new(now + Duration::hours(1), 1.0, 2.0, 0.5, 1.0);
        let provider = InMemoryProvider::new(vec![before, at_now, later]);

        let store = load_store(&provider, 10, now, ReferenceZone::new_york()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.last_time(), Some(now));
    }

    #[test]
    fn load_latest_anchors_on_last_bar() {
        let last = Utc.with_ymd_and_hms(2024, 1, 20, 15, 0, 0).unwrap();
        let old = Bar::new(last - Duration::days(12), 1.0, 2.0, 0.5, 1.0);
        let mid = Bar::new(last - Duration::days(2), 1.0, 2.0, 0.5, 1.0);
        let newest = Bar::new(last, 1.0, 2.0, 0.5, 1.0);
        let provider = InMemoryProvider::new(vec![newest, old, mid.clone()]);

        let (store, right_edge) = load_latest(&provider, 10, ReferenceZone::new_york())
            .unwrap()
            .unwrap();
        assert_eq!(right_edge, last);
        assert_eq!(store.len(), 2);
        assert_eq!(store.first_time(), Some(mid.time_utc));
        assert_eq!(store.report().supplied, 3);
    }

    #[test]
    fn load_latest_on_empty_provider_is_none() {
        let provider = InMemoryProvider::new(Vec::new());
        assert!(load_latest(&provider, 10, ReferenceZone::new_york())
            .unwrap()
            .is_none());
    }
}
