//! Service orchestration tests for the task board.

use std::sync::Arc;

use crate::account::{
    adapters::memory::InMemoryDirectory,
    domain::{Account, AccountId, EmailAddress, PartnerRole},
    ports::Directory,
};
use crate::notification::{
    adapters::memory::InMemoryNotificationStore, domain::NotificationKind,
    ports::NotificationStore,
};
use crate::session::Session;
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{TaskAuthorship, TaskDomainError, TaskStatus},
    ports::{TaskEvent, TaskStore},
    services::{CreateTaskRequest, TaskAssignee, TaskBoardError, TaskBoardService},
};
use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = TaskBoardService<
    InMemoryDirectory,
    InMemoryTaskStore,
    InMemoryNotificationStore,
    DefaultClock,
>;

struct Harness {
    service: TestService,
    directory: Arc<InMemoryDirectory>,
    store: Arc<InMemoryTaskStore>,
    notifications: Arc<InMemoryNotificationStore>,
    clock: Arc<DefaultClock>,
}

#[fixture]
fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryTaskStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let clock = Arc::new(DefaultClock);
    let service = TaskBoardService::new(
        Arc::clone(&directory),
        Arc::clone(&store),
        Arc::clone(&notifications),
        Arc::clone(&clock),
    );
    Harness {
        service,
        directory,
        store,
        notifications,
        clock,
    }
}

fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::days(1)
}

async fn register(harness: &Harness, email: &str, first: &str, role: PartnerRole) -> Account {
    let email = EmailAddress::new(email).expect("valid email");
    let account =
        Account::new(email, first, "Tester", role, &*harness.clock).expect("valid account");
    harness
        .directory
        .insert(&account)
        .await
        .expect("account stored");
    account
}

/// Registers two accounts and links them directly through the directory.
async fn register_couple(harness: &Harness) -> (Account, Account) {
    let adam = register(harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let eve = register(harness, "eve@example.com", "Eve", PartnerRole::Wife).await;
    harness
        .directory
        .append_invitation(eve.id(), adam.id())
        .await
        .expect("invitation");
    harness
        .directory
        .link_partners(eve.id(), adam.id())
        .await
        .expect("link");
    (adam, eve)
}

async fn board_is_empty(harness: &Harness, owner: AccountId) -> bool {
    harness
        .store
        .list_by_owner(owner)
        .await
        .expect("listing")
        .is_empty()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_on_own_board(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());

    let request = CreateTaskRequest::new("Buy milk", TaskAssignee::Own)
        .with_description("the 2% kind")
        .with_due_date(tomorrow());
    let task = harness
        .service
        .create_task(&session, request)
        .await
        .expect("task created");

    assert_eq!(task.status(), TaskStatus::ToDo);
    assert_eq!(task.owner_id(), adam.id());
    assert_eq!(task.creator_id(), Some(adam.id()));
    assert_eq!(task.authorship(), TaskAuthorship::SelfAuthored);
    assert!(!harness.service.due_state(&task).is_expired());

    let stored = harness
        .store
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("stored task");
    assert_eq!(stored, task);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_on_partner_board(harness: Harness) {
    let (adam, eve) = register_couple(&harness).await;
    let session = Session::for_account(adam.id());

    let request =
        CreateTaskRequest::new("Water the plants", TaskAssignee::Partner).with_due_date(tomorrow());
    let task = harness
        .service
        .create_task(&session, request)
        .await
        .expect("task created");

    assert_eq!(task.owner_id(), eve.id());
    assert_eq!(task.creator_id(), Some(adam.id()));
    assert_eq!(task.authorship(), TaskAuthorship::PartnerAssigned);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_for_partner_requires_link(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());

    let request =
        CreateTaskRequest::new("Water the plants", TaskAssignee::Partner).with_due_date(tomorrow());
    let result = harness.service.create_task(&session, request).await;

    assert!(matches!(result, Err(TaskBoardError::NoPartnerLinked)));
    assert!(board_is_empty(&harness, adam.id()).await);
}

#[rstest]
#[case(TaskAssignee::Own)]
#[case(TaskAssignee::Partner)]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_never_persists_invalid_input(
    harness: Harness,
    #[case] assignee: TaskAssignee,
) {
    let (adam, eve) = register_couple(&harness).await;
    let session = Session::for_account(adam.id());

    let blank_title = CreateTaskRequest::new("   ", assignee).with_due_date(tomorrow());
    let result = harness.service.create_task(&session, blank_title).await;
    assert!(matches!(
        result,
        Err(TaskBoardError::Domain(TaskDomainError::EmptyTitle))
    ));

    let missing_due = CreateTaskRequest::new("Buy milk", assignee);
    let result = harness.service.create_task(&session, missing_due).await;
    assert!(matches!(
        result,
        Err(TaskBoardError::Domain(TaskDomainError::MissingDueDate))
    ));

    assert!(board_is_empty(&harness, adam.id()).await);
    assert!(board_is_empty(&harness, eve.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn change_status_walks_the_lifecycle(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    let task = harness
        .service
        .change_status(task.id(), TaskStatus::InProgress, None)
        .await
        .expect("start");
    assert_eq!(task.status(), TaskStatus::InProgress);

    let task = harness
        .service
        .change_status(task.id(), TaskStatus::Done, None)
        .await
        .expect("finish");
    assert_eq!(task.status(), TaskStatus::Done);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_from_done_requires_due_date(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");
    harness
        .service
        .change_status(task.id(), TaskStatus::Done, None)
        .await
        .expect("finish");

    let result = harness
        .service
        .change_status(task.id(), TaskStatus::ToDo, None)
        .await;
    assert!(matches!(
        result,
        Err(TaskBoardError::Domain(
            TaskDomainError::RestartRequiresDueDate(_)
        ))
    ));

    let fresh_due = tomorrow() + Duration::days(6);
    let task = harness
        .service
        .change_status(task.id(), TaskStatus::ToDo, Some(fresh_due))
        .await
        .expect("restart");
    assert_eq!(task.status(), TaskStatus::ToDo);
    assert_eq!(task.due_date(), fresh_due);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decline_removes_from_board_and_notifies_creator(harness: Harness) {
    let (adam, eve) = register_couple(&harness).await;
    let task = harness
        .service
        .create_task(
            &Session::for_account(adam.id()),
            CreateTaskRequest::new("Water the plants", TaskAssignee::Partner)
                .with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    let declined = harness
        .service
        .decline_task(&Session::for_account(eve.id()), task.id(), "too busy")
        .await
        .expect("decline");
    assert!(declined.is_declined());
    assert_eq!(declined.decline_message(), Some("too busy"));

    // Gone from Eve's active board, present in Adam's declined view.
    let eve_board = harness
        .service
        .board(eve.id())
        .await
        .expect("eve's board");
    assert!(eve_board.to_do.is_empty());
    assert!(eve_board.in_progress.is_empty());
    assert!(eve_board.done.is_empty());

    let declined_view = harness
        .service
        .declined_for_creator(&Session::for_account(adam.id()))
        .await
        .expect("declined view");
    assert_eq!(declined_view.len(), 1);
    assert_eq!(declined_view[0].id(), task.id());

    let adam_inbox = harness
        .notifications
        .list_for_recipient(adam.id())
        .await
        .expect("adam's inbox");
    assert_eq!(adam_inbox.len(), 1);
    assert_eq!(adam_inbox[0].kind(), NotificationKind::Task);
    assert!(adam_inbox[0].message().contains("too busy"));
    assert_eq!(adam_inbox[0].task_title(), Some("Water the plants"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decline_own_task_emits_no_notification(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    harness
        .service
        .decline_task(&session, task.id(), "changed my mind")
        .await
        .expect("decline");

    let inbox = harness
        .notifications
        .list_for_recipient(adam.id())
        .await
        .expect("inbox");
    assert!(inbox.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reactivate_returns_task_to_the_board(harness: Harness) {
    let (adam, eve) = register_couple(&harness).await;
    let task = harness
        .service
        .create_task(
            &Session::for_account(adam.id()),
            CreateTaskRequest::new("Water the plants", TaskAssignee::Partner)
                .with_due_date(tomorrow()),
        )
        .await
        .expect("task created");
    harness
        .service
        .decline_task(&Session::for_account(eve.id()), task.id(), "too busy")
        .await
        .expect("decline");

    let task = harness
        .service
        .reactivate_task(task.id())
        .await
        .expect("reactivate");
    assert!(!task.is_declined());
    assert_eq!(task.status(), TaskStatus::ToDo);

    let eve_board = harness
        .service
        .board(eve.id())
        .await
        .expect("eve's board");
    assert_eq!(eve_board.to_do.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_overwrites_and_marks_edited(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    let new_due = tomorrow() + Duration::days(2);
    let edited = harness
        .service
        .edit_task(task.id(), "Buy oat milk", "barista edition", new_due)
        .await
        .expect("edit");

    assert!(edited.is_edited());
    assert_eq!(edited.title(), "Buy oat milk");
    assert_eq!(edited.due_date(), new_due);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_removes_the_record(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    harness
        .service
        .delete_task(task.id())
        .await
        .expect("delete");

    assert!(board_is_empty(&harness, adam.id()).await);
    let result = harness.service.delete_task(task.id()).await;
    assert!(matches!(result, Err(TaskBoardError::TaskNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_publishes_an_event_for_open_views(harness: Harness) {
    let adam = register(&harness, "adam@example.com", "Adam", PartnerRole::Husband).await;
    let session = Session::for_account(adam.id());
    let task = harness
        .service
        .create_task(
            &session,
            CreateTaskRequest::new("Buy milk", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("task created");

    // A detail view subscribes, the task is deleted elsewhere, and the
    // deletion event tells the view to dismiss itself.
    let mut receiver = harness.store.subscribe();
    harness
        .service
        .delete_task(task.id())
        .await
        .expect("delete");

    let mut saw_deletion = false;
    while let Ok(event) = receiver.try_recv() {
        if let TaskEvent::Deleted { id, owner_id } = event {
            assert_eq!(id, task.id());
            assert_eq!(owner_id, adam.id());
            saw_deletion = true;
        }
    }
    assert!(saw_deletion);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_groups_by_status_and_hides_declined(harness: Harness) {
    let (adam, eve) = register_couple(&harness).await;
    let adam_session = Session::for_account(adam.id());
    let eve_session = Session::for_account(eve.id());

    let todo = harness
        .service
        .create_task(
            &eve_session,
            CreateTaskRequest::new("Fold laundry", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("todo task");
    let started = harness
        .service
        .create_task(
            &eve_session,
            CreateTaskRequest::new("Paint the fence", TaskAssignee::Own).with_due_date(tomorrow()),
        )
        .await
        .expect("started task");
    harness
        .service
        .change_status(started.id(), TaskStatus::InProgress, None)
        .await
        .expect("start");
    let assigned = harness
        .service
        .create_task(
            &adam_session,
            CreateTaskRequest::new("Water the plants", TaskAssignee::Partner)
                .with_due_date(tomorrow()),
        )
        .await
        .expect("assigned task");
    harness
        .service
        .decline_task(&eve_session, assigned.id(), "allergic")
        .await
        .expect("decline");

    let board = harness.service.board(eve.id()).await.expect("board");
    assert_eq!(board.to_do.len(), 1);
    assert_eq!(board.to_do[0].id(), todo.id());
    assert_eq!(board.in_progress.len(), 1);
    assert_eq!(board.in_progress[0].id(), started.id());
    assert!(board.done.is_empty());
    assert!(board.pending_approval.is_empty());
}
