//! Derived due-state buckets for display and gating.

use chrono::{DateTime, Duration, Utc};

/// How much time remains before a task's due date.
///
/// This is derived from the due date and the current clock on every read
/// and is never persisted. `Expired` gates most mutating actions in the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    /// The due date has passed.
    Expired,
    /// Less than an hour remains.
    Minutes(i64),
    /// Less than a day remains.
    Hours(i64),
    /// A day or more remains.
    Days(i64),
}

impl DueState {
    /// Computes the due-state bucket for a due date at the given instant.
    ///
    /// Remaining time of zero or less is `Expired`; under an hour counts in
    /// minutes; under a day counts in hours; anything longer counts in days.
    #[must_use]
    pub fn at(due_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = due_date.signed_duration_since(now);
        if remaining <= Duration::zero() {
            Self::Expired
        } else if remaining < Duration::hours(1) {
            Self::Minutes(remaining.num_minutes())
        } else if remaining < Duration::days(1) {
            Self::Hours(remaining.num_hours())
        } else {
            Self::Days(remaining.num_days())
        }
    }

    /// Returns whether the due date has passed.
    #[must_use]
    pub const fn is_expired(self) -> bool {
        matches!(self, Self::Expired)
    }
}
