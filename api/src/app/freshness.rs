//! Freshness check
//!
//! A feed is working when its sources produced a record within the expected
//! receive period. The comparison is strict: no grace period, no averaging.
//! `now` is always passed in so callers and tests control the clock.

use chrono::{DateTime, Duration, Utc};

/// True iff a record arrived and `now - last_received_at <= period`.
///
/// A period too long to represent never elapses.
pub fn is_fresh(
    last_received_at: Option<DateTime<Utc>>,
    expected_receive_period_in_days: u64,
    now: DateTime<Utc>,
) -> bool {
    let Some(last) = last_received_at else {
        return false;
    };

    let period = i64::try_from(expected_receive_period_in_days)
        .ok()
        .and_then(Duration::try_days);

    match period {
        Some(period) => now.signed_duration_since(last) <= period,
        None => true,
    }
}
