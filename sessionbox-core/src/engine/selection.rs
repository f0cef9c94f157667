//! Display selection: bounded most-recent subsets of open and mitigated ranges.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::SessionRange;

/// Independent caps for each class so one cannot crowd out the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCaps {
    pub max_unmitigated: usize,
    pub max_mitigated: usize,
}

impl Default for SelectionCaps {
    fn default() -> Self {
        Self {
            max_unmitigated: 5,
            max_mitigated: 5,
        }
    }
}

fn newest_first(a: &&SessionRange, b: &&SessionRange) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.key.cmp(&b.key))
}

fn chronological(a: &&SessionRange, b: &&SessionRange) -> Ordering {
    a.date.cmp(&b.date).then_with(|| a.key.cmp(&b.key))
}

/// Pick at most `max_unmitigated` open/broken ranges and `max_mitigated`
/// mitigated ranges, most recent first within each class, then return the
/// union in chronological order (date, then key).
///
/// Ranges beyond the caps are left out of the result, not removed from `ranges`.
pub fn select_for_display(ranges: &[SessionRange], caps: SelectionCaps) -> Vec<&SessionRange> {
    let (mut mitigated, mut unmitigated): (Vec<&SessionRange>, Vec<&SessionRange>) =
        ranges.iter().partition(|r| r.mitigated());

    unmitigated.sort_by(newest_first);
    unmitigated.truncate(caps.max_unmitigated);
    mitigated.sort_by(newest_first);
    mitigated.truncate(caps.max_mitigated);

    let mut selected = unmitigated;
    selected.append(&mut mitigated);
    selected.sort_by(chronological);
    selected
}
