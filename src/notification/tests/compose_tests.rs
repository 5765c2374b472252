//! Unit tests for notification message composition.

use crate::account::domain::{Account, EmailAddress, PartnerRole};
use crate::notification::services::compose;
use mockable::DefaultClock;
use rstest::rstest;

fn account(first: &str, last: &str, role: PartnerRole) -> Account {
    let email = EmailAddress::new(format!("{}@example.com", first.to_lowercase()))
        .expect("valid email");
    Account::new(email, first, last, role, &DefaultClock).expect("valid account")
}

#[rstest]
fn rejection_wording_follows_the_rejecting_role() {
    let eve = account("Eve", "Stone", PartnerRole::Wife);
    let message = compose::invitation_rejected(&eve).expect("rendered message");
    assert!(message.contains("Eve Stone"));
    assert!(message.contains("She may accept"));

    let adam = account("Adam", "Stone", PartnerRole::Husband);
    let message = compose::invitation_rejected(&adam).expect("rendered message");
    assert!(message.contains("He may accept"));
}

#[rstest]
fn decline_message_carries_title_and_reason() {
    let eve = account("Eve", "Stone", PartnerRole::Wife);
    let message =
        compose::task_declined(&eve, "Water the plants", "too busy").expect("rendered message");
    assert!(message.contains("Eve"));
    assert!(message.contains("\"Water the plants\""));
    assert!(message.contains("too busy"));
}

#[rstest]
fn removal_message_names_the_task() {
    let message = compose::task_removed("Book the trip").expect("rendered message");
    assert!(message.contains("\"Book the trip\""));
    assert!(message.contains("partnership ended"));
}
