//! `PostgreSQL` adapter integration tests.
//!
//! These run only when `DATABASE_URL` points at a reachable database; on a
//! machine without one the tests skip silently. Each run uses fresh
//! identities so reruns against the same database stay independent.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::shadow_unrelated,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]

use chrono::{Duration, Utc};
use diesel::RunQueryDsl;
use mockable::DefaultClock;
use once_cell::sync::Lazy;
use tandem::account::{
    adapters::postgres::PostgresDirectory,
    domain::{Account, EmailAddress, PartnerRole},
    ports::{Directory, DirectoryError},
};
use tandem::db::{PgPool, pool_from_env};
use tandem::notification::{
    adapters::postgres::PostgresNotificationStore,
    domain::{Notification, NotificationKind},
    ports::NotificationStore,
};
use tandem::task::{
    adapters::postgres::PostgresTaskStore,
    domain::{Task, TaskAuthorship, TaskDraft, TaskPriority, TaskStatus},
    ports::TaskStore,
};
use uuid::Uuid;

const SCHEMA_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        role VARCHAR(20) NOT NULL,
        partner_id UUID,
        invitations JSONB NOT NULL,
        profile JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        creator_id UUID,
        authorship VARCHAR(20) NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        due_date TIMESTAMPTZ NOT NULL,
        priority VARCHAR(20) NOT NULL,
        status VARCHAR(30) NOT NULL,
        declined BOOLEAN NOT NULL,
        decline_message TEXT,
        edited BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        recipient_id UUID NOT NULL,
        kind VARCHAR(30) NOT NULL,
        message TEXT NOT NULL,
        related_id UUID,
        task_title VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL,
        \"read\" BOOLEAN NOT NULL
    )",
];

/// Builds a pool and prepares the schema, or `None` when no database is
/// configured. Shared across the tests so the DDL runs once.
static POOL: Lazy<Option<PgPool>> = Lazy::new(|| {
    let pool = pool_from_env().ok()?;
    let mut connection = pool.get().ok()?;
    for ddl in SCHEMA_DDL {
        diesel::sql_query(*ddl)
            .execute(&mut connection)
            .expect("schema preparation");
    }
    Some(pool)
});

fn prepare_database() -> Option<PgPool> {
    POOL.clone()
}

fn fresh_account(first: &str, role: PartnerRole) -> Account {
    let email = EmailAddress::new(format!("{}-{}@example.com", first, Uuid::new_v4()))
        .expect("valid email");
    Account::new(email, first, "Integration", role, &DefaultClock).expect("valid account")
}

#[tokio::test(flavor = "multi_thread")]
async fn directory_roundtrip_and_atomic_pairing() {
    let Some(pool) = prepare_database() else {
        return;
    };
    let directory = PostgresDirectory::new(pool);

    let adam = fresh_account("Adam", PartnerRole::Husband);
    let eve = fresh_account("Eve", PartnerRole::Wife);
    directory.insert(&adam).await.expect("adam stored");
    directory.insert(&eve).await.expect("eve stored");

    // Duplicate email is refused.
    let clone = Account::new(
        adam.email().clone(),
        "Copy",
        "Cat",
        PartnerRole::Husband,
        &DefaultClock,
    )
    .expect("valid account");
    let result = directory.insert(&clone).await;
    assert!(matches!(result, Err(DirectoryError::DuplicateEmail(_))));

    // Lookup by id and by email agree.
    let by_id = directory
        .find_by_id(adam.id())
        .await
        .expect("lookup")
        .expect("adam exists");
    let by_email = directory
        .find_by_email(adam.email())
        .await
        .expect("lookup")
        .expect("adam exists");
    assert_eq!(by_id, by_email);

    // Invitation append and atomic acceptance.
    directory
        .append_invitation(eve.id(), adam.id())
        .await
        .expect("invitation");
    let linked = directory
        .link_partners(eve.id(), adam.id())
        .await
        .expect("link");
    assert_eq!(linked.initiator.partner_id(), Some(adam.id()));
    assert_eq!(linked.counterpart.partner_id(), Some(eve.id()));
    assert!(linked.initiator.invitations().is_empty());

    // A second pairing attempt against either side is rejected outright.
    let lila = fresh_account("Lila", PartnerRole::Wife);
    directory.insert(&lila).await.expect("lila stored");
    let result = directory.link_partners(lila.id(), adam.id()).await;
    assert!(matches!(result, Err(DirectoryError::AlreadyPartnered(_))));
    let lila_after = directory
        .find_by_id(lila.id())
        .await
        .expect("lookup")
        .expect("lila exists");
    assert!(!lila_after.is_linked());

    // Dissolution clears both sides atomically.
    let unlinked = directory
        .unlink_partners(eve.id(), adam.id())
        .await
        .expect("unlink");
    assert!(!unlinked.initiator.is_linked());
    assert!(!unlinked.counterpart.is_linked());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_store_roundtrip_and_cascade() {
    let Some(pool) = prepare_database() else {
        return;
    };
    let store = PostgresTaskStore::new(pool.clone());
    let directory = PostgresDirectory::new(pool);

    let adam = fresh_account("Adam", PartnerRole::Husband);
    let eve = fresh_account("Eve", PartnerRole::Wife);
    directory.insert(&adam).await.expect("adam stored");
    directory.insert(&eve).await.expect("eve stored");

    let draft = TaskDraft {
        title: "Water the plants".to_owned(),
        description: "back porch too".to_owned(),
        due_date: Utc::now() + Duration::days(2),
        priority: TaskPriority::High,
    };
    let mut task = Task::new(
        eve.id(),
        Some(adam.id()),
        TaskAuthorship::PartnerAssigned,
        draft,
        &DefaultClock,
    )
    .expect("valid task");
    store.insert(&task).await.expect("task stored");

    task.transition_to(TaskStatus::InProgress, None, &DefaultClock)
        .expect("start");
    store.update(&task).await.expect("task updated");

    let fetched = store
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(fetched.status(), TaskStatus::InProgress);
    assert_eq!(fetched.authorship(), TaskAuthorship::PartnerAssigned);

    let board = store.list_by_owner(eve.id()).await.expect("board");
    assert_eq!(board.len(), 1);

    let removed = store
        .delete_exchanged_between(adam.id(), eve.id())
        .await
        .expect("cascade");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id(), task.id());
    assert!(
        store
            .list_by_owner(eve.id())
            .await
            .expect("board")
            .is_empty()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn notification_store_roundtrip() {
    let Some(pool) = prepare_database() else {
        return;
    };
    let store = PostgresNotificationStore::new(pool);
    let recipient = fresh_account("Mara", PartnerRole::Wife);

    let notification = Notification::new(
        recipient.id(),
        NotificationKind::Invitation,
        "You have a new invitation.",
        &DefaultClock,
    )
    .expect("valid notification");
    store.insert(&notification).await.expect("stored");

    store.mark_read(notification.id()).await.expect("mark read");
    let inbox = store
        .list_for_recipient(recipient.id())
        .await
        .expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].is_read());

    let filtered = store
        .list_for_recipient_of_kinds(
            recipient.id(),
            &[NotificationKind::Invitation, NotificationKind::TaskDeleted],
        )
        .await
        .expect("filtered inbox");
    assert_eq!(filtered.len(), 1);

    store.delete(notification.id()).await.expect("delete");
    store
        .delete(notification.id())
        .await
        .expect("second delete is a no-op");
    assert!(
        store
            .list_for_recipient(recipient.id())
            .await
            .expect("inbox")
            .is_empty()
    );
}
