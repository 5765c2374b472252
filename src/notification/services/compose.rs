//! Message composition for workflow fan-out.
//!
//! Each composition is a pure function over a template so the wording lives
//! in one place and the workflows only supply the facts.

use crate::account::domain::{Account, PartnerRole};
use crate::notification::domain::NotificationDomainError;
use minijinja::{Environment, context};

const INVITATION_REJECTED: &str = "{{ first_name }} {{ last_name }} has turned down your \
     partner invitation. {{ pronoun }} may accept a new invitation later.";

const TASK_DECLINED: &str =
    "{{ first_name }} declined the task \"{{ title }}\": {{ reason }}";

const TASK_REMOVED: &str =
    "The task \"{{ title }}\" was removed because your partnership ended.";

/// Composes the message sent to an inviter whose invitation was rejected.
///
/// The wording depends on the rejecting account's role.
///
/// # Errors
///
/// Returns [`NotificationDomainError::Template`] when rendering fails.
pub fn invitation_rejected(rejecting: &Account) -> Result<String, NotificationDomainError> {
    let pronoun = match rejecting.role() {
        PartnerRole::Husband => "He",
        PartnerRole::Wife => "She",
    };
    render(
        INVITATION_REJECTED,
        context! {
            first_name => rejecting.first_name(),
            last_name => rejecting.last_name(),
            pronoun => pronoun,
        },
    )
}

/// Composes the message sent to a task's creator when the assignee declines.
///
/// # Errors
///
/// Returns [`NotificationDomainError::Template`] when rendering fails.
pub fn task_declined(
    decliner: &Account,
    title: &str,
    reason: &str,
) -> Result<String, NotificationDomainError> {
    render(
        TASK_DECLINED,
        context! {
            first_name => decliner.first_name(),
            title => title,
            reason => reason,
        },
    )
}

/// Composes the message sent to a task's owner when the task is removed by
/// a partnership dissolution.
///
/// # Errors
///
/// Returns [`NotificationDomainError::Template`] when rendering fails.
pub fn task_removed(title: &str) -> Result<String, NotificationDomainError> {
    render(TASK_REMOVED, context! { title => title })
}

fn render(
    template: &str,
    ctx: minijinja::Value,
) -> Result<String, NotificationDomainError> {
    let environment = Environment::new();
    environment
        .render_str(template, ctx)
        .map_err(|error| NotificationDomainError::Template(error.to_string()))
}
