//! Persistence ports consumed by the lifecycle managers.
//!
//! [`Store`] serves non-transactional reads and opens transactions.
//! [`StoreTx`] carries every write; dropping it without [`StoreTx::commit`]
//! rolls the work back.

use async_trait::async_trait;

use crate::audit::{AuditLog, AuditLogFilter, NewAuditLog};
use crate::error::StoreError;
use crate::project::{NewProject, Project, ProjectFilter};
use crate::task::{NewTask, Task, TaskFilter};
use crate::types::DbId;
use crate::user::{NewUser, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Tx: StoreTx;

    async fn begin(&self) -> StoreResult<Self::Tx>;

    // -- users --
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn list_project_members(&self, project_id: DbId) -> StoreResult<Vec<User>>;

    // -- projects --
    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>>;
    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>>;

    // -- tasks --
    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>>;
    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;

    // -- audit --
    async fn list_audit_logs(&self, filter: &AuditLogFilter) -> StoreResult<Vec<AuditLog>>;
}

#[async_trait]
pub trait StoreTx: Send {
    // -- users --
    async fn find_user(&mut self, id: DbId) -> StoreResult<Option<User>>;
    /// Resolve whichever of `ids` exist; missing ids are skipped.
    async fn find_users(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<User>;
    async fn save_user(&mut self, user: &User) -> StoreResult<User>;
    async fn delete_user(&mut self, id: DbId) -> StoreResult<bool>;

    // -- projects --
    /// Load a project for modification, locking its row.
    async fn find_project(&mut self, id: DbId) -> StoreResult<Option<Project>>;
    async fn insert_project(&mut self, project: &NewProject) -> StoreResult<Project>;
    /// Write every column and replace the member set.
    async fn save_project(&mut self, project: &Project) -> StoreResult<Project>;
    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool>;

    // -- tasks --
    async fn find_task(&mut self, id: DbId) -> StoreResult<Option<Task>>;
    async fn insert_task(&mut self, task: &NewTask) -> StoreResult<Task>;
    /// Write every column and replace the responsible set.
    async fn save_task(&mut self, task: &Task) -> StoreResult<Task>;
    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool>;
    /// Delete every task owned by a project, returning how many went.
    async fn delete_project_tasks(&mut self, project_id: DbId) -> StoreResult<u64>;

    // -- audit --
    async fn append_audit(&mut self, entry: &NewAuditLog) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;
}
