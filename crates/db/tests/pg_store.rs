//! Integration tests for `PgStore` against a real database.
//!
//! Each test gets a fresh database with migrations applied. They are ignored
//! by default; run with `DATABASE_URL` set and `--ignored`.

use std::collections::BTreeSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use projman_core::audit::{AuditLogFilter, EntityKind, RequestContext};
use projman_core::error::CoreError;
use projman_core::lifecycle::{ProjectLifecycle, TaskLifecycle};
use projman_core::project::ProjectInput;
use projman_core::status::{ProjectStatus, TaskStatus};
use projman_core::store::{Store, StoreTx};
use projman_core::task::TaskInput;
use projman_core::user::{NewUser, User};
use projman_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_user(store: &PgStore, name: &str) -> User {
    let mut tx = store.begin().await.unwrap();
    let user = tx
        .insert_user(&NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
            registered_at: Utc::now(),
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    user
}

fn project_input(name: &str, end: NaiveDate) -> ProjectInput {
    ProjectInput {
        name: name.to_string(),
        description: "description".to_string(),
        start_date: Some(date(2026, 1, 1)),
        expected_end_date: Some(end),
        manager_id: None,
        budget: 100.0,
        priority: None,
        completion_pct: 0,
    }
}

fn task_input(project_id: i64, name: &str, end: NaiveDate) -> TaskInput {
    TaskInput {
        name: name.to_string(),
        description: "description".to_string(),
        start_date: Some(date(2026, 1, 1)),
        expected_end_date: Some(end),
        project_id: Some(project_id),
        completion_pct: 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn project_round_trip_with_members(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    let alice = seed_user(&store, "Alice").await;
    let bob = seed_user(&store, "Bob").await;
    let projects = ProjectLifecycle::new(store.clone());
    let ctx = RequestContext::default();

    let project = projects
        .create(alice.id, project_input("Apollo", date(2026, 6, 1)), &ctx)
        .await
        .unwrap();
    projects
        .add_member(alice.id, project.id, bob.id, &ctx)
        .await
        .unwrap();

    let found = projects.find_by_id(project.id).await.unwrap();
    assert_eq!(found.member_ids, BTreeSet::from([bob.id]));
    assert_eq!(found.creator_id, Some(alice.id));

    let for_bob = projects.find_for_user(bob.id).await.unwrap();
    assert_eq!(for_bob.len(), 1);

    let err = projects
        .add_member(alice.id, project.id, bob.id, &ctx)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let logs = store
        .list_audit_logs(&AuditLogFilter {
            entity_kind: Some(EntityKind::Project),
            limit: 10,
            ..AuditLogFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn project_delete_removes_tasks_first(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    let manager = seed_user(&store, "Manager").await;
    let projects = ProjectLifecycle::new(store.clone());
    let tasks = TaskLifecycle::new(store.clone());
    let ctx = RequestContext::default();

    let project = projects
        .create(manager.id, project_input("Apollo", date(2026, 6, 1)), &ctx)
        .await
        .unwrap();
    projects
        .set_manager(manager.id, project.id, manager.id, &ctx)
        .await
        .unwrap();
    let task = tasks
        .create(
            manager.id,
            task_input(project.id, "Wiring", date(2026, 2, 1)),
            manager.id,
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(task.responsible_ids, BTreeSet::from([manager.id]));

    projects.delete(manager.id, project.id, &ctx).await.unwrap();

    assert!(store.find_task(task.id).await.unwrap().is_none());
    assert!(store.find_project(project.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn sweeps_mark_overdue_rows_late(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    let manager = seed_user(&store, "Manager").await;
    let projects = ProjectLifecycle::new(store.clone());
    let tasks = TaskLifecycle::new(store.clone());
    let ctx = RequestContext::default();

    let project = projects
        .create(manager.id, project_input("Old", date(2026, 1, 31)), &ctx)
        .await
        .unwrap();
    projects
        .set_manager(manager.id, project.id, manager.id, &ctx)
        .await
        .unwrap();
    let task = tasks
        .create(
            manager.id,
            task_input(project.id, "Old task", date(2026, 1, 15)),
            manager.id,
            &ctx,
        )
        .await
        .unwrap();

    let today = date(2026, 3, 1);
    assert_eq!(projects.sweep_overdue_as_of(today).await.unwrap().marked_late, 1);
    assert_eq!(tasks.sweep_overdue_as_of(today).await.unwrap().marked_late, 1);
    assert_eq!(projects.sweep_overdue_as_of(today).await.unwrap().marked_late, 0);

    assert_eq!(
        projects.find_by_id(project.id).await.unwrap().status,
        ProjectStatus::Late
    );
    assert_eq!(
        tasks.find_by_id(task.id).await.unwrap().status,
        TaskStatus::Late
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn dropped_transaction_rolls_back(pool: PgPool) {
    let store = PgStore::new(pool);
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&NewUser {
            name: "Ghost".into(),
            email: "ghost@example.com".into(),
            password_hash: "hash".into(),
            registered_at: Utc::now(),
        })
        .await
        .unwrap();
    }
    assert!(store
        .find_user_by_email("ghost@example.com")
        .await
        .unwrap()
        .is_none());
}
