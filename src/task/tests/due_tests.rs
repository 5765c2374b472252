//! Unit tests for due-state bucket derivation.

use crate::task::domain::DueState;
use chrono::{Duration, TimeZone, Utc};
use rstest::rstest;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[rstest]
fn past_due_date_is_expired() {
    let due = now() - Duration::minutes(1);
    assert_eq!(DueState::at(due, now()), DueState::Expired);
    assert!(DueState::at(due, now()).is_expired());
}

#[rstest]
fn due_exactly_now_is_expired() {
    assert_eq!(DueState::at(now(), now()), DueState::Expired);
}

#[rstest]
fn under_an_hour_counts_minutes() {
    let due = now() + Duration::minutes(45);
    assert_eq!(DueState::at(due, now()), DueState::Minutes(45));
}

#[rstest]
fn under_a_minute_rounds_down_to_zero_minutes() {
    let due = now() + Duration::seconds(30);
    assert_eq!(DueState::at(due, now()), DueState::Minutes(0));
}

#[rstest]
fn exactly_one_hour_counts_hours() {
    let due = now() + Duration::hours(1);
    assert_eq!(DueState::at(due, now()), DueState::Hours(1));
}

#[rstest]
fn under_a_day_counts_hours() {
    let due = now() + Duration::hours(23) + Duration::minutes(30);
    assert_eq!(DueState::at(due, now()), DueState::Hours(23));
}

#[rstest]
fn a_day_or_more_counts_days() {
    let due = now() + Duration::days(1);
    assert_eq!(DueState::at(due, now()), DueState::Days(1));

    let due = now() + Duration::days(12) + Duration::hours(6);
    assert_eq!(DueState::at(due, now()), DueState::Days(12));
}
