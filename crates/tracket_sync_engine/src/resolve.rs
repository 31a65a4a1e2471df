//! Whole-record conflict resolution.
//!
//! Last-writer-wins by recency: the incoming record replaces the local
//! one iff it carries a timestamp strictly newer than the local one,
//! treating a missing local timestamp as minus infinity. Equal
//! timestamps and untimestamped incoming records never replace. There is
//! no field-level merge.

use chrono::{DateTime, Utc};
use tracket_model::{DoneEntry, Entry};

/// Returns true iff `incoming` is timestamped and strictly newer than
/// `current`.
pub fn newer_wins(
    current: Option<DateTime<Utc>>,
    incoming: Option<DateTime<Utc>>,
) -> bool {
    match (current, incoming) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(current), Some(incoming)) => incoming > current,
    }
}

/// Decides whether an incoming entry should replace the local one,
/// keyed on `updated_at`.
pub fn should_replace_entry(current: &Entry, incoming: &Entry) -> bool {
    newer_wins(current.updated_at, incoming.updated_at)
}

/// Decides whether an incoming completion record should replace the
/// local one, keyed on `done_at`.
pub fn should_replace_done_entry(current: &DoneEntry, incoming: &DoneEntry) -> bool {
    newer_wins(current.done_at, incoming.done_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use tracket_model::DoneEntry;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn untimestamped_incoming_never_replaces() {
        assert!(!newer_wins(None, None));
        assert!(!newer_wins(Some(ts(100)), None));
    }

    #[test]
    fn untimestamped_current_loses_to_any_timestamp() {
        assert!(newer_wins(None, Some(ts(0))));
        assert!(newer_wins(None, Some(ts(100))));
    }

    #[test]
    fn equal_timestamps_never_replace() {
        assert!(!newer_wins(Some(ts(100)), Some(ts(100))));
    }

    #[test]
    fn strictly_newer_replaces() {
        assert!(newer_wins(Some(ts(100)), Some(ts(101))));
        assert!(!newer_wins(Some(ts(101)), Some(ts(100))));
    }

    #[test]
    fn entry_resolution_keys_on_updated_at() {
        let mut current = Entry::task("local");
        let mut incoming = current.clone();
        current.updated_at = Some(ts(100));
        incoming.updated_at = Some(ts(200));

        assert!(should_replace_entry(&current, &incoming));
        assert!(!should_replace_entry(&incoming, &current));
    }

    #[test]
    fn done_entry_resolution_keys_on_done_at() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut current = DoneEntry::new("habit-1", day);
        let mut incoming = current.clone();
        current.done_at = Some(ts(100));
        incoming.done_at = Some(ts(50));

        assert!(!should_replace_done_entry(&current, &incoming));
        incoming.done_at = Some(ts(150));
        assert!(should_replace_done_entry(&current, &incoming));
    }

    proptest! {
        // The rule, restated independently: treat a missing current
        // timestamp as minus infinity; replace iff the incoming
        // timestamp exists and is strictly greater.
        #[test]
        fn replacement_matches_recency_rule(
            current in proptest::option::of(0i64..2_000_000_000),
            incoming in proptest::option::of(0i64..2_000_000_000),
        ) {
            let current_ts = current.map(ts);
            let incoming_ts = incoming.map(ts);

            let floor = current.unwrap_or(i64::MIN);
            let expected = incoming.map_or(false, |i| i > floor);

            prop_assert_eq!(newer_wins(current_ts, incoming_ts), expected);
        }

        #[test]
        fn resolution_is_deterministic(
            current in proptest::option::of(0i64..2_000_000_000),
            incoming in proptest::option::of(0i64..2_000_000_000),
        ) {
            let current_ts = current.map(ts);
            let incoming_ts = incoming.map(ts);
            let first = newer_wins(current_ts, incoming_ts);
            prop_assert_eq!(newer_wins(current_ts, incoming_ts), first);
        }
    }
}
