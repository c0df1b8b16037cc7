//! [`PgStore`]: PostgreSQL implementation of the core store ports.

use async_trait::async_trait;
use projman_core::audit::{AuditLog, AuditLogFilter, NewAuditLog};
use projman_core::error::StoreError;
use projman_core::project::{NewProject, Project, ProjectFilter};
use projman_core::store::{Store, StoreResult, StoreTx};
use projman_core::task::{NewTask, Task, TaskFilter};
use projman_core::types::DbId;
use projman_core::user::{NewUser, User};
use sqlx::pool::PoolConnection;
use sqlx::{Postgres, Transaction};

use crate::repositories::{AuditLogRepo, ProjectRepo, TaskRepo, UserRepo};
use crate::DbPool;

fn store_err(err: sqlx::Error) -> StoreError {
    StoreError::new(err)
}

/// Reads go straight to the pool; writes go through [`PgStoreTx`].
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn conn(&self) -> StoreResult<PoolConnection<Postgres>> {
        self.pool.acquire().await.map_err(store_err)
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgStoreTx;

    async fn begin(&self) -> StoreResult<PgStoreTx> {
        let tx = self.pool.begin().await.map_err(store_err)?;
        Ok(PgStoreTx { tx })
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        UserRepo::find_by_id(&mut conn, id).await.map_err(store_err)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn().await?;
        UserRepo::find_by_email(&mut conn, email)
            .await
            .map_err(store_err)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        UserRepo::list(&mut conn).await.map_err(store_err)
    }

    async fn list_project_members(&self, project_id: DbId) -> StoreResult<Vec<User>> {
        let mut conn = self.conn().await?;
        UserRepo::list_by_project(&mut conn, project_id)
            .await
            .map_err(store_err)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        let mut conn = self.conn().await?;
        ProjectRepo::find_by_id(&mut conn, id)
            .await
            .map_err(store_err)
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let mut conn = self.conn().await?;
        ProjectRepo::list(&mut conn, filter).await.map_err(store_err)
    }

    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>> {
        let mut conn = self.conn().await?;
        TaskRepo::find_by_id(&mut conn, id).await.map_err(store_err)
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let mut conn = self.conn().await?;
        TaskRepo::list(&mut conn, filter).await.map_err(store_err)
    }

    async fn list_audit_logs(&self, filter: &AuditLogFilter) -> StoreResult<Vec<AuditLog>> {
        let mut conn = self.conn().await?;
        AuditLogRepo::query(&mut conn, filter)
            .await
            .map_err(store_err)
    }
}

/// One database transaction. Dropping it without [`StoreTx::commit`] rolls
/// back.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_user(&mut self, id: DbId) -> StoreResult<Option<User>> {
        UserRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(store_err)
    }

    async fn find_users(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        UserRepo::find_many(&mut self.tx, ids)
            .await
            .map_err(store_err)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        UserRepo::find_by_email(&mut self.tx, email)
            .await
            .map_err(store_err)
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<User> {
        UserRepo::create(&mut self.tx, user).await.map_err(store_err)
    }

    async fn save_user(&mut self, user: &User) -> StoreResult<User> {
        UserRepo::update(&mut self.tx, user).await.map_err(store_err)
    }

    async fn delete_user(&mut self, id: DbId) -> StoreResult<bool> {
        UserRepo::delete(&mut self.tx, id).await.map_err(store_err)
    }

    async fn find_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        ProjectRepo::find_for_update(&mut self.tx, id)
            .await
            .map_err(store_err)
    }

    async fn insert_project(&mut self, project: &NewProject) -> StoreResult<Project> {
        ProjectRepo::create(&mut self.tx, project)
            .await
            .map_err(store_err)
    }

    async fn save_project(&mut self, project: &Project) -> StoreResult<Project> {
        ProjectRepo::update(&mut self.tx, project)
            .await
            .map_err(store_err)
    }

    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool> {
        ProjectRepo::delete(&mut self.tx, id)
            .await
            .map_err(store_err)
    }

    async fn find_task(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        TaskRepo::find_for_update(&mut self.tx, id)
            .await
            .map_err(store_err)
    }

    async fn insert_task(&mut self, task: &NewTask) -> StoreResult<Task> {
        TaskRepo::create(&mut self.tx, task).await.map_err(store_err)
    }

    async fn save_task(&mut self, task: &Task) -> StoreResult<Task> {
        TaskRepo::update(&mut self.tx, task).await.map_err(store_err)
    }

    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool> {
        TaskRepo::delete(&mut self.tx, id).await.map_err(store_err)
    }

    async fn delete_project_tasks(&mut self, project_id: DbId) -> StoreResult<u64> {
        TaskRepo::delete_by_project(&mut self.tx, project_id)
            .await
            .map_err(store_err)
    }

    async fn append_audit(&mut self, entry: &NewAuditLog) -> StoreResult<()> {
        AuditLogRepo::create(&mut self.tx, entry)
            .await
            .map_err(store_err)
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(store_err)
    }
}
