//! In-memory store used by the lifecycle integration tests.
//!
//! Each transaction holds the store lock and works on a private copy of the
//! data; `commit` writes the copy back and dropping the transaction discards
//! it, which mirrors rollback semantics closely enough for these tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use projman_core::audit::{AuditLog, AuditLogFilter, NewAuditLog, RequestContext};
use projman_core::error::{BoxError, StoreError};
use projman_core::project::{NewProject, Project, ProjectFilter, ProjectInput};
use projman_core::store::{Store, StoreResult, StoreTx};
use projman_core::task::{NewTask, Task, TaskFilter, TaskInput};
use projman_core::types::DbId;
use projman_core::user::{CredentialHasher, NewUser, User};

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Data {
    pub users: BTreeMap<DbId, User>,
    pub projects: BTreeMap<DbId, Project>,
    pub tasks: BTreeMap<DbId, Task>,
    pub audit: Vec<AuditLog>,
    next_id: DbId,
}

impl Data {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

fn project_matches(project: &Project, filter: &ProjectFilter) -> bool {
    let status_ok = filter.status.map_or(true, |s| project.status == s);
    let participant_ok = filter.participant_id.map_or(true, |uid| {
        project.member_ids.contains(&uid)
            || project.manager_id == Some(uid)
            || project.creator_id == Some(uid)
    });
    status_ok && participant_ok
}

fn task_matches(task: &Task, filter: &TaskFilter) -> bool {
    filter.status.map_or(true, |s| task.status == s)
        && filter
            .responsible_id
            .map_or(true, |uid| task.responsible_ids.contains(&uid))
        && filter.project_id.map_or(true, |pid| task.project_id == pid)
}

fn injected(message: &str) -> StoreError {
    StoreError::new(message.to_string())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
    fail_audit: AtomicBool,
    failing_saves: std::sync::Mutex<BTreeSet<DbId>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every audit append fail until reset.
    pub fn fail_audit(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Make saves of the given project or task id fail.
    pub fn fail_saves_for(&self, id: DbId) {
        self.failing_saves.lock().unwrap().insert(id);
    }

    pub async fn snapshot(&self) -> Data {
        self.data.lock().await.clone()
    }

    pub async fn audit_logs(&self) -> Vec<AuditLog> {
        self.data.lock().await.audit.clone()
    }

    /// Insert a user directly, bypassing the directory.
    pub async fn seed_user(&self, name: &str) -> User {
        let mut data = self.data.lock().await;
        let id = data.next_id();
        let user = User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hashed:secret".to_string(),
            registered_at: chrono::Utc::now(),
        };
        data.users.insert(id, user.clone());
        user
    }

    /// Overwrite a stored project directly.
    pub async fn put_project(&self, project: Project) {
        self.data.lock().await.projects.insert(project.id, project);
    }

    pub async fn put_task(&self, task: Task) {
        self.data.lock().await.tasks.insert(task.id, task);
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = Arc::clone(&self.data).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx {
            guard,
            work,
            fail_audit: self.fail_audit.load(Ordering::SeqCst),
            failing_saves: self.failing_saves.lock().unwrap().clone(),
        })
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.data.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.lock().await;
        Ok(data.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.data.lock().await.users.values().cloned().collect())
    }

    async fn list_project_members(&self, project_id: DbId) -> StoreResult<Vec<User>> {
        let data = self.data.lock().await;
        let Some(project) = data.projects.get(&project_id) else {
            return Ok(Vec::new());
        };
        Ok(project
            .member_ids
            .iter()
            .filter_map(|id| data.users.get(id).cloned())
            .collect())
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.data.lock().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let data = self.data.lock().await;
        Ok(data
            .projects
            .values()
            .filter(|p| project_matches(p, &filter))
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(self.data.lock().await.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let data = self.data.lock().await;
        Ok(data
            .tasks
            .values()
            .filter(|t| task_matches(t, &filter))
            .cloned()
            .collect())
    }

    async fn list_audit_logs(&self, filter: &AuditLogFilter) -> StoreResult<Vec<AuditLog>> {
        let data = self.data.lock().await;
        Ok(data
            .audit
            .iter()
            .rev()
            .filter(|a| filter.user_id.map_or(true, |uid| a.user_id == uid))
            .filter(|a| {
                filter
                    .entity_kind
                    .map_or(true, |k| a.entity_kind == k.as_str())
            })
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

pub struct MemoryTx {
    guard: OwnedMutexGuard<Data>,
    work: Data,
    fail_audit: bool,
    failing_saves: BTreeSet<DbId>,
}

impl MemoryTx {
    fn check_save(&self, id: DbId) -> StoreResult<()> {
        if self.failing_saves.contains(&id) {
            return Err(injected("injected save failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_user(&mut self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn find_users(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.work.users.get(id).cloned())
            .collect())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.work.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<User> {
        let id = self.work.next_id();
        let user = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            registered_at: user.registered_at,
        };
        self.work.users.insert(id, user.clone());
        Ok(user)
    }

    async fn save_user(&mut self, user: &User) -> StoreResult<User> {
        self.work.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete_user(&mut self, id: DbId) -> StoreResult<bool> {
        let removed = self.work.users.remove(&id).is_some();
        for project in self.work.projects.values_mut() {
            project.member_ids.remove(&id);
            if project.manager_id == Some(id) {
                project.manager_id = None;
            }
            if project.creator_id == Some(id) {
                project.creator_id = None;
            }
        }
        for task in self.work.tasks.values_mut() {
            task.responsible_ids.remove(&id);
        }
        Ok(removed)
    }

    async fn find_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.work.projects.get(&id).cloned())
    }

    async fn insert_project(&mut self, p: &NewProject) -> StoreResult<Project> {
        let id = self.work.next_id();
        let project = Project {
            id,
            name: p.name.clone(),
            description: p.description.clone(),
            start_date: p.start_date,
            expected_end_date: p.expected_end_date,
            created_at: p.created_at,
            status: p.status,
            manager_id: p.manager_id,
            creator_id: Some(p.creator_id),
            budget: p.budget,
            priority: p.priority.clone(),
            completion_pct: p.completion_pct,
            member_ids: BTreeSet::new(),
        };
        self.work.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn save_project(&mut self, project: &Project) -> StoreResult<Project> {
        self.check_save(project.id)?;
        self.work.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool> {
        if self.work.tasks.values().any(|t| t.project_id == id) {
            return Err(injected("tasks still reference the project"));
        }
        Ok(self.work.projects.remove(&id).is_some())
    }

    async fn find_task(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(self.work.tasks.get(&id).cloned())
    }

    async fn insert_task(&mut self, t: &NewTask) -> StoreResult<Task> {
        let id = self.work.next_id();
        let task = Task {
            id,
            project_id: t.project_id,
            name: t.name.clone(),
            description: t.description.clone(),
            start_date: t.start_date,
            expected_end_date: t.expected_end_date,
            status: t.status,
            completion_pct: t.completion_pct,
            completed_at: None,
            created_at: t.created_at,
            responsible_ids: t.responsible_ids.clone(),
        };
        self.work.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn save_task(&mut self, task: &Task) -> StoreResult<Task> {
        self.check_save(task.id)?;
        self.work.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.work.tasks.remove(&id).is_some())
    }

    async fn delete_project_tasks(&mut self, project_id: DbId) -> StoreResult<u64> {
        let before = self.work.tasks.len();
        self.work.tasks.retain(|_, t| t.project_id != project_id);
        Ok((before - self.work.tasks.len()) as u64)
    }

    async fn append_audit(&mut self, entry: &NewAuditLog) -> StoreResult<()> {
        if self.fail_audit {
            return Err(injected("audit sink unavailable"));
        }
        let id = self.work.next_id();
        self.work.audit.push(AuditLog {
            id,
            occurred_at: entry.occurred_at,
            user_id: entry.user_id,
            action: entry.action.clone(),
            detail: entry.detail.clone(),
            entity_kind: entry.entity_kind.as_str().to_string(),
            client_ip: entry.context.client_ip.clone(),
            user_agent: entry.context.user_agent.clone(),
            origin: entry.context.origin.clone(),
            session_id: entry.context.session_id.clone(),
        });
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let MemoryTx {
            mut guard, work, ..
        } = self;
        *guard = work;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Stores `hashed:<plaintext>` so tests can see what was hashed.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, BoxError> {
        Ok(format!("hashed:{plaintext}"))
    }
}

pub fn ctx() -> RequestContext {
    RequestContext {
        client_ip: Some("203.0.113.7".into()),
        user_agent: Some("integration-test".into()),
        origin: Some("http://localhost:5173".into()),
        session_id: Some("session-1".into()),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn project_input(name: &str) -> ProjectInput {
    ProjectInput {
        name: name.to_string(),
        description: format!("{name} description"),
        start_date: Some(date(2026, 1, 1)),
        expected_end_date: Some(date(2026, 12, 31)),
        manager_id: None,
        budget: 5000.0,
        priority: Some("high".into()),
        completion_pct: 0,
    }
}

pub fn task_input(project_id: DbId, name: &str) -> TaskInput {
    TaskInput {
        name: name.to_string(),
        description: format!("{name} description"),
        start_date: Some(date(2026, 2, 1)),
        expected_end_date: Some(date(2026, 3, 1)),
        project_id: Some(project_id),
        completion_pct: 0,
    }
}
