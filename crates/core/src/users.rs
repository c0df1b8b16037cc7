//! User directory: registration, profile updates, removal, lookups, and the
//! per-user workload summary.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::audit::{actions, AuditRecorder, EntityKind, RequestContext};
use crate::diff::ChangeSet;
use crate::error::{require_id, CoreError, StoreError};
use crate::lifecycle::load_actor;
use crate::project::ProjectFilter;
use crate::status::{ProjectStatus, TaskStatus};
use crate::store::{Store, StoreTx};
use crate::task::TaskFilter;
use crate::types::DbId;
use crate::user::{CredentialHasher, NewUser, Registration, User, UserPerformance, UserUpdate};
use crate::validation::ensure_valid;

const ENTITY: &str = "User";

pub struct UserDirectory<S: Store> {
    store: Arc<S>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<S: Store> Clone for UserDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<S: Store> UserDirectory<S> {
    pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    fn hash(&self, plaintext: &str) -> Result<String, CoreError> {
        self.hasher
            .hash(plaintext)
            .map_err(|e| CoreError::unexpected("Failed to hash credential", e))
    }

    /// Register a new user. The new user is the actor of its own audit entry.
    pub async fn register(
        &self,
        input: Registration,
        ctx: &RequestContext,
    ) -> Result<User, CoreError> {
        ensure_valid(&input)?;
        let email = normalize_email(&input.email);

        let mut tx = self.store.begin().await?;
        if tx.find_user_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "A user with email '{email}' already exists"
            )));
        }

        let new_user = NewUser {
            name: input.name.trim().to_string(),
            email,
            password_hash: self.hash(&input.password)?,
            registered_at: Utc::now(),
        };
        let user = tx.insert_user(&new_user).await?;

        AuditRecorder::record(
            &mut tx,
            &user,
            actions::USER_REGISTERED,
            format!("User {} registered", user.id),
            EntityKind::User,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Record a successful sign-in for `user_id`.
    pub async fn record_login(&self, user_id: DbId, ctx: &RequestContext) -> Result<(), CoreError> {
        let mut tx = self.store.begin().await?;
        let user = load_actor(&mut tx, user_id).await?;
        AuditRecorder::record(
            &mut tx,
            &user,
            actions::USER_LOGGED_IN,
            format!("User {} logged in", user.id),
            EntityKind::User,
            ctx,
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn update(
        &self,
        actor_id: DbId,
        id: DbId,
        input: UserUpdate,
        ctx: &RequestContext,
    ) -> Result<User, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("user_id", id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let existing = tx
            .find_user(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;

        ensure_valid(&input)?;
        let email = normalize_email(&input.email);
        if email != existing.email {
            if let Some(other) = tx.find_user_by_email(&email).await? {
                if other.id != id {
                    return Err(CoreError::Conflict(format!(
                        "A user with email '{email}' already exists"
                    )));
                }
            }
        }

        let mut updated = existing.clone();
        updated.name = input.name.trim().to_string();
        updated.email = email;
        if let Some(password) = &input.password {
            updated.password_hash = self.hash(password)?;
        }

        let mut changes = ChangeSet::new();
        changes
            .compare("Name", &existing.name, &updated.name)
            .compare("Email", &existing.email, &updated.email)
            .compare_redacted("Password", &existing.password_hash, &updated.password_hash);
        let saved = tx.save_user(&updated).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::USER_UPDATED,
            format!("User {id}. {}", changes.render()),
            EntityKind::User,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(user_id = id, changed = ?changes.labels(), "User updated");
        Ok(saved)
    }

    /// Remove a user. Audit history written by the user is kept.
    pub async fn delete(
        &self,
        actor_id: DbId,
        id: DbId,
        ctx: &RequestContext,
    ) -> Result<(), CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("user_id", id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        if tx.find_user(id).await?.is_none() {
            return Err(CoreError::NotFound { entity: ENTITY, id });
        }

        let wrap = |e: StoreError| CoreError::unexpected(format!("Failed to delete user {id}"), e);
        tx.delete_user(id).await.map_err(wrap)?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::USER_DELETED,
            format!("User {id} deleted"),
            EntityKind::User,
            ctx,
        )
        .await?;
        tx.commit().await.map_err(wrap)?;

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_all(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<User, CoreError> {
        require_id("user_id", id)?;
        self.store
            .find_user(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        Ok(self.store.find_user_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_by_project(&self, project_id: DbId) -> Result<Vec<User>, CoreError> {
        require_id("project_id", project_id)?;
        if self.store.find_project(project_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }
        Ok(self.store.list_project_members(project_id).await?)
    }

    /// Count the projects a user takes part in and the tasks they are
    /// responsible for, grouped by status.
    pub async fn performance(&self, user_id: DbId) -> Result<UserPerformance, CoreError> {
        let user = self.find_by_id(user_id).await?;

        let projects = self
            .store
            .list_projects(ProjectFilter {
                participant_id: Some(user.id),
                ..ProjectFilter::default()
            })
            .await?;
        let tasks = self
            .store
            .list_tasks(TaskFilter {
                responsible_id: Some(user.id),
                ..TaskFilter::default()
            })
            .await?;

        let mut projects_by_status: BTreeMap<&'static str, usize> =
            ProjectStatus::ALL.iter().map(|s| (s.name(), 0)).collect();
        for project in &projects {
            *projects_by_status.entry(project.status.name()).or_default() += 1;
        }

        let mut tasks_by_status: BTreeMap<&'static str, usize> =
            TaskStatus::ALL.iter().map(|s| (s.name(), 0)).collect();
        for task in &tasks {
            *tasks_by_status.entry(task.status.name()).or_default() += 1;
        }

        Ok(UserPerformance {
            user_id: user.id,
            total_projects: projects.len(),
            total_tasks: tasks.len(),
            projects_by_status,
            tasks_by_status,
        })
    }
}
