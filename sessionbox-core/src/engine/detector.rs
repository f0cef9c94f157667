//! Breakout and mitigation detection.
//!
//! Both scans use closing prices only and stop at the first match:
//! - breakout: first bar strictly after the session end whose close is
//!   strictly outside `[low, high]`
//! - mitigation: first later bar whose close crosses the opposite boundary
//!
//! Running out of data is a normal terminal state, not an error.

use crate::data::BarStore;
use crate::domain::{BreakDirection, SessionRange};

/// Advance `range` through `Open -> Broken -> Mitigated` using `store`.
///
/// Expects a freshly built (open) range; already-broken ranges are left as is.
pub fn detect(range: &mut SessionRange, store: &BarStore) {
    let after_session = store.after(range.end_utc);

    let Some((offset, direction)) = after_session
        .iter()
        .enumerate()
        .find_map(|(i, bar)| {
            BreakDirection::classify(bar.close, range.low, range.high).map(|dir| (i, dir))
        })
    else {
        return;
    };

    let breakout = &after_session[offset];
    range.record_breakout(direction, breakout.time_utc);

    if let Some(mitigation) = after_session[offset + 1..]
        .iter()
        .find(|bar| direction.is_mitigated_by(bar.close, range.low, range.high))
    {
        range.record_mitigation(mitigation.time_utc);
    }
}

/// Run [`detect`] over every range.
pub fn detect_all(ranges: &mut [SessionRange], store: &BarStore) {
    for range in ranges.iter_mut() {
        detect(range, store);
    }
}
