//! Unit tests for task domain invariants and the status state machine.

use crate::account::domain::AccountId;
use crate::task::domain::{
    Task, TaskAuthorship, TaskDomainError, TaskDraft, TaskPriority, TaskStatus,
};
use chrono::{Duration, Utc};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_owned(),
        description: "details".to_owned(),
        due_date: Utc::now() + Duration::days(3),
        priority: TaskPriority::Medium,
    }
}

fn build_task(clock: &DefaultClock) -> Task {
    let owner = AccountId::new();
    Task::new(
        owner,
        Some(owner),
        TaskAuthorship::SelfAuthored,
        draft("Buy groceries"),
        clock,
    )
    .expect("valid task")
}

#[rstest]
fn new_task_starts_in_to_do(clock: DefaultClock) {
    let task = build_task(&clock);
    assert_eq!(task.status(), TaskStatus::ToDo);
    assert!(!task.is_declined());
    assert!(!task.is_edited());
    assert!(task.decline_message().is_none());
}

#[rstest]
fn new_task_rejects_blank_title(clock: DefaultClock) {
    let owner = AccountId::new();
    let result = Task::new(
        owner,
        Some(owner),
        TaskAuthorship::SelfAuthored,
        draft("   "),
        &clock,
    );
    assert_eq!(result.expect_err("blank title"), TaskDomainError::EmptyTitle);
}

#[rstest]
#[case(TaskStatus::ToDo, TaskStatus::ToDo, false)]
#[case(TaskStatus::ToDo, TaskStatus::InProgress, true)]
#[case(TaskStatus::ToDo, TaskStatus::Done, true)]
#[case(TaskStatus::ToDo, TaskStatus::PendingApproval, false)]
#[case(TaskStatus::InProgress, TaskStatus::ToDo, true)]
#[case(TaskStatus::InProgress, TaskStatus::InProgress, false)]
#[case(TaskStatus::InProgress, TaskStatus::Done, true)]
#[case(TaskStatus::InProgress, TaskStatus::PendingApproval, false)]
#[case(TaskStatus::Done, TaskStatus::ToDo, true)]
#[case(TaskStatus::Done, TaskStatus::InProgress, false)]
#[case(TaskStatus::Done, TaskStatus::Done, false)]
#[case(TaskStatus::Done, TaskStatus::PendingApproval, false)]
#[case(TaskStatus::PendingApproval, TaskStatus::ToDo, false)]
#[case(TaskStatus::PendingApproval, TaskStatus::InProgress, false)]
#[case(TaskStatus::PendingApproval, TaskStatus::Done, false)]
#[case(TaskStatus::PendingApproval, TaskStatus::PendingApproval, false)]
fn can_transition_to_returns_expected(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
fn restart_requires_new_due_date(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = build_task(&clock);
    task.transition_to(TaskStatus::Done, None, &clock)?;

    let result = task.transition_to(TaskStatus::ToDo, None, &clock);
    ensure!(result == Err(TaskDomainError::RestartRequiresDueDate(task.id())));
    ensure!(task.status() == TaskStatus::Done);

    let fresh_due = Utc::now() + Duration::days(7);
    task.transition_to(TaskStatus::ToDo, Some(fresh_due), &clock)?;
    ensure!(task.status() == TaskStatus::ToDo);
    ensure!(task.due_date() == fresh_due);
    Ok(())
}

#[rstest]
fn forward_transition_ignores_extra_due_date(clock: DefaultClock) {
    let mut task = build_task(&clock);
    let original_due = task.due_date();
    task.transition_to(TaskStatus::InProgress, Some(Utc::now()), &clock)
        .expect("start");
    assert_eq!(task.due_date(), original_due);
}

#[rstest]
fn decline_requires_reason(clock: DefaultClock) {
    let mut task = build_task(&clock);
    let result = task.decline("  ", &clock);
    assert_eq!(
        result.expect_err("blank reason"),
        TaskDomainError::EmptyDeclineReason
    );
    assert!(!task.is_declined());
}

#[rstest]
fn decline_keeps_status_and_stores_reason(clock: DefaultClock) {
    let mut task = build_task(&clock);
    task.transition_to(TaskStatus::InProgress, None, &clock)
        .expect("start");
    task.decline("too busy", &clock).expect("decline");

    assert!(task.is_declined());
    assert_eq!(task.decline_message(), Some("too busy"));
    assert_eq!(task.status(), TaskStatus::InProgress);
}

#[rstest]
fn decline_rejects_done_and_double_decline(clock: DefaultClock) {
    let mut task = build_task(&clock);
    task.decline("first", &clock).expect("decline");
    let result = task.decline("again", &clock);
    assert_eq!(
        result.expect_err("double decline"),
        TaskDomainError::AlreadyDeclined(task.id())
    );

    let mut finished = build_task(&clock);
    finished
        .transition_to(TaskStatus::Done, None, &clock)
        .expect("finish");
    let result = finished.decline("too late", &clock);
    assert_eq!(
        result.expect_err("decline after done"),
        TaskDomainError::DeclineCompletedTask(finished.id())
    );
}

#[rstest]
fn reactivate_restores_to_do_and_clears_reason(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = build_task(&clock);
    task.transition_to(TaskStatus::InProgress, None, &clock)?;
    task.decline("not now", &clock)?;

    task.reactivate(&clock)?;
    ensure!(!task.is_declined());
    ensure!(task.decline_message().is_none());
    ensure!(task.status() == TaskStatus::ToDo);
    Ok(())
}

#[rstest]
fn reactivate_requires_declined_flag(clock: DefaultClock) {
    let mut task = build_task(&clock);
    let result = task.reactivate(&clock);
    assert_eq!(
        result.expect_err("not declined"),
        TaskDomainError::NotDeclined(task.id())
    );
}

#[rstest]
fn edit_overwrites_fields_and_marks_edited(clock: DefaultClock) {
    let mut task = build_task(&clock);
    let new_due = Utc::now() + Duration::days(10);
    task.edit("Buy oat milk", "the barista kind", new_due, &clock)
        .expect("edit");

    assert_eq!(task.title(), "Buy oat milk");
    assert_eq!(task.description(), "the barista kind");
    assert_eq!(task.due_date(), new_due);
    assert!(task.is_edited());
}

#[rstest]
fn edit_rejects_blank_title(clock: DefaultClock) {
    let mut task = build_task(&clock);
    let result = task.edit("", "whatever", Utc::now(), &clock);
    assert_eq!(result.expect_err("blank title"), TaskDomainError::EmptyTitle);
    assert!(!task.is_edited());
}

#[rstest]
#[case("to_do", Some(TaskStatus::ToDo))]
#[case(" Done ", Some(TaskStatus::Done))]
#[case("pending_approval", Some(TaskStatus::PendingApproval))]
#[case("archived", None)]
fn status_parsing(#[case] raw: &str, #[case] expected: Option<TaskStatus>) {
    let parsed = TaskStatus::try_from(raw);
    match expected {
        Some(status) => assert_eq!(parsed.expect("parse should succeed"), status),
        None => assert!(parsed.is_err()),
    }
}
