//! Staleness policy.

use chrono::NaiveDate;

pub const DEFAULT_STALENESS_DAYS: u32 = 30;

/// Whether a title last searched on `last` should be searched again.
///
/// A title never searched is always stale. Otherwise it is stale once
/// strictly more than `threshold_days` have passed. A date in the future
/// counts as fresh.
pub fn needs_research(last: Option<NaiveDate>, threshold_days: u32, today: NaiveDate) -> bool {
    match last {
        None => true,
        Some(last) => (today - last).num_days() > i64::from(threshold_days),
    }
}
