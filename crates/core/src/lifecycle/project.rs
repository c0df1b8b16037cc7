//! Project lifecycle: creation, updates, membership, manager assignment,
//! deletion, filtered reads, and the overdue sweep.

use std::sync::Arc;

use chrono::Utc;

use crate::audit::{actions, AuditRecorder, EntityKind, RequestContext};
use crate::error::{require_id, CoreError, StoreError};
use crate::lifecycle::{load_actor, load_user, SweepReport};
use crate::project::{derive_status, NewProject, Project, ProjectFilter, ProjectInput};
use crate::status::ProjectStatus;
use crate::store::{Store, StoreTx};
use crate::types::{Date, DbId};
use crate::validation::ensure_valid;

const ENTITY: &str = "Project";

pub struct ProjectLifecycle<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for ProjectLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

async fn load_project<T: StoreTx + ?Sized>(tx: &mut T, id: DbId) -> Result<Project, CoreError> {
    tx.find_project(id)
        .await?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })
}

fn required_date(value: Option<Date>, field: &str) -> Result<Date, CoreError> {
    value.ok_or_else(|| CoreError::InvalidInput(format!("{field} is required")))
}

impl<S: Store> ProjectLifecycle<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a project owned by the acting user, starting at `CREATED` / 0%.
    pub async fn create(
        &self,
        actor_id: DbId,
        input: ProjectInput,
        ctx: &RequestContext,
    ) -> Result<Project, CoreError> {
        require_id("actor_id", actor_id)?;
        if let Some(manager_id) = input.manager_id {
            require_id("manager_id", manager_id)?;
        }

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;

        let created_at = Utc::now();
        ensure_valid(&input)?;
        if let Some(manager_id) = input.manager_id {
            load_user(&mut tx, manager_id).await?;
        }

        let new_project = NewProject {
            start_date: required_date(input.start_date, "start_date")?,
            expected_end_date: required_date(input.expected_end_date, "expected_end_date")?,
            name: input.name,
            description: input.description,
            created_at,
            status: ProjectStatus::Created,
            manager_id: input.manager_id,
            creator_id: actor.id,
            budget: input.budget,
            priority: input.priority,
            completion_pct: 0,
        };
        let project = tx.insert_project(&new_project).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_CREATED,
            format!("Project {} '{}' created", project.id, project.name),
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id = project.id, creator_id = actor.id, "Project created");
        Ok(project)
    }

    /// Overwrite the editable fields, re-derive the status, and audit the diff.
    pub async fn update(
        &self,
        actor_id: DbId,
        id: DbId,
        input: ProjectInput,
        ctx: &RequestContext,
    ) -> Result<Project, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("project_id", id)?;
        if let Some(manager_id) = input.manager_id {
            require_id("manager_id", manager_id)?;
        }

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let existing = load_project(&mut tx, id).await?;

        ensure_valid(&input)?;
        if let Some(manager_id) = input.manager_id {
            load_user(&mut tx, manager_id).await?;
        }

        let mut updated = existing.clone();
        updated.start_date = required_date(input.start_date, "start_date")?;
        updated.expected_end_date = required_date(input.expected_end_date, "expected_end_date")?;
        updated.name = input.name;
        updated.description = input.description;
        updated.manager_id = input.manager_id;
        updated.budget = input.budget;
        updated.priority = input.priority;
        updated.completion_pct = input.completion_pct;
        updated.status = derive_status(existing.status, input.completion_pct);

        let changes = Project::changes(&existing, &updated);
        let saved = tx.save_project(&updated).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_UPDATED,
            format!("Project {id}. {}", changes.render()),
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(project_id = id, changed = ?changes.labels(), "Project updated");
        Ok(saved)
    }

    /// Add a member. Adding an existing member is a conflict.
    pub async fn add_member(
        &self,
        actor_id: DbId,
        project_id: DbId,
        user_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Project, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("project_id", project_id)?;
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let mut project = load_project(&mut tx, project_id).await?;
        let user = load_user(&mut tx, user_id).await?;

        if project.member_ids.contains(&user.id) {
            return Err(CoreError::Conflict(format!(
                "User {} is already a member of project {}",
                user.id, project.id
            )));
        }
        project.member_ids.insert(user.id);
        let saved = tx.save_project(&project).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_MEMBER_ADDED,
            format!("User {} added to project {}", user.id, project.id),
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, user_id, "Member added to project");
        Ok(saved)
    }

    /// Remove a member. Removing a non-member changes nothing but is still
    /// audited.
    pub async fn remove_member(
        &self,
        actor_id: DbId,
        project_id: DbId,
        user_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Project, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("project_id", project_id)?;
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let mut project = load_project(&mut tx, project_id).await?;
        let user = load_user(&mut tx, user_id).await?;

        let detail = if project.member_ids.remove(&user.id) {
            format!("User {} removed from project {}", user.id, project.id)
        } else {
            format!("User {} was not a member of project {}", user.id, project.id)
        };
        let saved = tx.save_project(&project).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_MEMBER_REMOVED,
            detail,
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, user_id, "Member removed from project");
        Ok(saved)
    }

    /// Replace the project manager unconditionally.
    pub async fn set_manager(
        &self,
        actor_id: DbId,
        project_id: DbId,
        user_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Project, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("project_id", project_id)?;
        require_id("user_id", user_id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let mut project = load_project(&mut tx, project_id).await?;
        let user = load_user(&mut tx, user_id).await?;

        project.manager_id = Some(user.id);
        let saved = tx.save_project(&project).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_MANAGER_SET,
            format!("User {} set as manager of project {}", user.id, project.id),
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, manager_id = user_id, "Project manager set");
        Ok(saved)
    }

    /// Delete a project and its tasks in one transaction.
    ///
    /// Failures past the lookup come back as [`CoreError::Unexpected`] with
    /// the underlying cause attached.
    pub async fn delete(
        &self,
        actor_id: DbId,
        id: DbId,
        ctx: &RequestContext,
    ) -> Result<(), CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("project_id", id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let project = load_project(&mut tx, id).await?;

        let wrap =
            |e: StoreError| CoreError::unexpected(format!("Failed to delete project {id}"), e);
        let tasks_deleted = tx.delete_project_tasks(project.id).await.map_err(wrap)?;
        tx.delete_project(project.id).await.map_err(wrap)?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::PROJECT_DELETED,
            format!(
                "Project {} '{}' deleted with {tasks_deleted} task(s)",
                project.id, project.name
            ),
            EntityKind::Project,
            ctx,
        )
        .await?;
        tx.commit().await.map_err(wrap)?;

        tracing::info!(project_id = id, tasks_deleted, "Project deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_all(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.store.list_projects(ProjectFilter::default()).await?)
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Project, CoreError> {
        require_id("project_id", id)?;
        self.store
            .find_project(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })
    }

    pub async fn find_by_status(&self, status: &str) -> Result<Vec<Project>, CoreError> {
        let status: ProjectStatus = status.parse()?;
        let filter = ProjectFilter {
            status: Some(status),
            ..ProjectFilter::default()
        };
        Ok(self.store.list_projects(filter).await?)
    }

    /// Projects the user belongs to, manages, or created.
    pub async fn find_for_user(&self, user_id: DbId) -> Result<Vec<Project>, CoreError> {
        require_id("user_id", user_id)?;
        self.ensure_user_exists(user_id).await?;
        let filter = ProjectFilter {
            participant_id: Some(user_id),
            ..ProjectFilter::default()
        };
        Ok(self.store.list_projects(filter).await?)
    }

    pub async fn find_for_user_by_status(
        &self,
        user_id: DbId,
        status: &str,
    ) -> Result<Vec<Project>, CoreError> {
        let status: ProjectStatus = status.parse()?;
        require_id("user_id", user_id)?;
        self.ensure_user_exists(user_id).await?;
        let filter = ProjectFilter {
            status: Some(status),
            participant_id: Some(user_id),
        };
        Ok(self.store.list_projects(filter).await?)
    }

    async fn ensure_user_exists(&self, user_id: DbId) -> Result<(), CoreError> {
        match self.store.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Overdue sweep
    // -----------------------------------------------------------------------

    /// Mark every project whose expected end has passed as `LATE`.
    pub async fn sweep_overdue(&self) -> Result<SweepReport, CoreError> {
        self.sweep_overdue_as_of(Utc::now().date_naive()).await
    }

    /// Sweep against an explicit calendar date.
    ///
    /// Each row is saved in its own transaction; a failing row is logged and
    /// counted, and the sweep moves on. Rows already `LATE` are not rewritten.
    pub async fn sweep_overdue_as_of(&self, today: Date) -> Result<SweepReport, CoreError> {
        let projects = self.store.list_projects(ProjectFilter::default()).await?;
        let mut report = SweepReport {
            scanned: projects.len(),
            ..SweepReport::default()
        };

        for project in projects
            .iter()
            .filter(|p| p.is_overdue(today) && p.status != ProjectStatus::Late)
        {
            match self.mark_late(project.id, today).await {
                Ok(true) => report.marked_late += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        project_id = project.id,
                        error = %e,
                        "Overdue sweep: failed to mark project late"
                    );
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            marked_late = report.marked_late,
            failed = report.failed,
            "Project overdue sweep finished"
        );
        Ok(report)
    }

    async fn mark_late(&self, id: DbId, today: Date) -> Result<bool, CoreError> {
        let mut tx = self.store.begin().await?;
        let Some(mut project) = tx.find_project(id).await? else {
            return Ok(false);
        };
        if !project.is_overdue(today) || project.status == ProjectStatus::Late {
            return Ok(false);
        }
        project.status = ProjectStatus::Late;
        tx.save_project(&project).await?;
        tx.commit().await?;
        Ok(true)
    }
}
