//! Task lifecycle: manager-only creation, updates, completion,
//! responsible-user assignment, deletion, filtered reads, and the overdue
//! sweep.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::audit::{actions, AuditRecorder, EntityKind, RequestContext};
use crate::error::{require_id, CoreError, StoreError};
use crate::lifecycle::{load_actor, load_user, SweepReport};
use crate::status::TaskStatus;
use crate::store::{Store, StoreTx};
use crate::task::{NewTask, Task, TaskFilter, TaskInput};
use crate::types::{Date, DbId};
use crate::validation::ensure_valid;

const ENTITY: &str = "Task";

/// Direction of a responsible-set change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assignment {
    Add,
    Remove,
}

pub struct TaskLifecycle<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for TaskLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

async fn load_task<T: StoreTx + ?Sized>(tx: &mut T, id: DbId) -> Result<Task, CoreError> {
    tx.find_task(id)
        .await?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })
}

fn format_ids<'a>(ids: impl IntoIterator<Item = &'a DbId>) -> String {
    let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(", "))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::InvalidInput(format!("{field} is required")))
}

impl<S: Store> TaskLifecycle<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a task under a project. Only that project's manager may do so.
    ///
    /// New tasks start `PENDING` at 0% whatever percentage the input carries.
    pub async fn create(
        &self,
        actor_id: DbId,
        input: TaskInput,
        responsible_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("responsible_id", responsible_id)?;
        let project_id = require_id("project_id", required(input.project_id, "project_id")?)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let project = tx
            .find_project(project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;

        if project.manager_id != Some(actor.id) {
            tracing::warn!(project_id, actor_id, "Task creation refused: not the project manager");
            return Err(CoreError::Unauthorized(format!(
                "Only the manager of project {project_id} can create tasks"
            )));
        }

        ensure_valid(&input)?;
        let responsible = load_user(&mut tx, responsible_id).await?;

        let new_task = NewTask {
            project_id: project.id,
            start_date: required(input.start_date, "start_date")?,
            expected_end_date: required(input.expected_end_date, "expected_end_date")?,
            name: input.name,
            description: input.description,
            status: TaskStatus::Pending,
            completion_pct: 0,
            created_at: Utc::now(),
            responsible_ids: BTreeSet::from([responsible.id]),
        };
        let task = tx.insert_task(&new_task).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::TASK_CREATED,
            format!(
                "Task {} '{}' created in project {} with responsible user {}",
                task.id, task.name, project.id, responsible.id
            ),
            EntityKind::Task,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(task_id = task.id, project_id, responsible_id, "Task created");
        Ok(task)
    }

    /// Overwrite the editable fields and apply the completion rule.
    pub async fn update(
        &self,
        actor_id: DbId,
        id: DbId,
        input: TaskInput,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("task_id", id)?;
        if let Some(project_id) = input.project_id {
            require_id("project_id", project_id)?;
        }

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let existing = load_task(&mut tx, id).await?;

        ensure_valid(&input)?;
        let project_id = required(input.project_id, "project_id")?;
        if project_id != existing.project_id && tx.find_project(project_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }

        let mut updated = existing.clone();
        updated.start_date = required(input.start_date, "start_date")?;
        updated.expected_end_date = required(input.expected_end_date, "expected_end_date")?;
        updated.name = input.name;
        updated.description = input.description;
        updated.project_id = project_id;
        updated.set_completion(input.completion_pct, Utc::now());

        let changes = Task::changes(&existing, &updated);
        let saved = tx.save_task(&updated).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::TASK_UPDATED,
            format!("Task {id}. {}", changes.render()),
            EntityKind::Task,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(task_id = id, changed = ?changes.labels(), "Task updated");
        Ok(saved)
    }

    /// Re-validate the stored task, then force it to `COMPLETED`.
    pub async fn complete(
        &self,
        actor_id: DbId,
        id: DbId,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("task_id", id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let existing = load_task(&mut tx, id).await?;
        ensure_valid(&existing)?;

        let mut completed = existing.clone();
        completed.complete(Utc::now());
        let changes = Task::changes(&existing, &completed);
        let saved = tx.save_task(&completed).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::TASK_COMPLETED,
            format!("Task {id} completed. {}", changes.render()),
            EntityKind::Task,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(task_id = id, "Task completed");
        Ok(saved)
    }

    pub async fn add_responsible(
        &self,
        actor_id: DbId,
        task_id: DbId,
        user_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        self.reassign(actor_id, task_id, &[user_id], Assignment::Add, ctx)
            .await
    }

    pub async fn remove_responsible(
        &self,
        actor_id: DbId,
        task_id: DbId,
        user_id: DbId,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        self.reassign(actor_id, task_id, &[user_id], Assignment::Remove, ctx)
            .await
    }

    /// Union the resolved users into the responsible set.
    pub async fn add_responsibles(
        &self,
        actor_id: DbId,
        task_id: DbId,
        user_ids: &[DbId],
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        self.reassign(actor_id, task_id, user_ids, Assignment::Add, ctx)
            .await
    }

    /// Remove the resolved users from the responsible set.
    pub async fn remove_responsibles(
        &self,
        actor_id: DbId,
        task_id: DbId,
        user_ids: &[DbId],
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        self.reassign(actor_id, task_id, user_ids, Assignment::Remove, ctx)
            .await
    }

    /// Shared path for responsible-set changes.
    ///
    /// The target ids are resolved as given; the acting user only appears in
    /// the audit entry. Ids that match no user are skipped, but if none
    /// match the call fails and the set is left alone.
    async fn reassign(
        &self,
        actor_id: DbId,
        task_id: DbId,
        user_ids: &[DbId],
        assignment: Assignment,
        ctx: &RequestContext,
    ) -> Result<Task, CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("task_id", task_id)?;
        if user_ids.is_empty() {
            return Err(CoreError::InvalidInput("user_ids must not be empty".into()));
        }
        for &user_id in user_ids {
            require_id("user_id", user_id)?;
        }

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let mut task = load_task(&mut tx, task_id).await?;

        let users = tx.find_users(user_ids).await?;
        if users.is_empty() {
            return Err(match user_ids {
                [single] => CoreError::NotFound {
                    entity: "User",
                    id: *single,
                },
                _ => CoreError::NoneFound {
                    entity: "User",
                    ids: user_ids.to_vec(),
                },
            });
        }
        let resolved: BTreeSet<DbId> = users.iter().map(|u| u.id).collect();

        let (action, verb) = match assignment {
            Assignment::Add => {
                task.responsible_ids.extend(&resolved);
                (actions::TASK_RESPONSIBLES_ADDED, "added to")
            }
            Assignment::Remove => {
                task.responsible_ids.retain(|id| !resolved.contains(id));
                (actions::TASK_RESPONSIBLES_REMOVED, "removed from")
            }
        };
        let saved = tx.save_task(&task).await?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            action,
            format!(
                "Users {} {verb} responsibles of task {task_id}",
                format_ids(&resolved)
            ),
            EntityKind::Task,
            ctx,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(task_id, users = ?resolved, ?assignment, "Task responsibles changed");
        Ok(saved)
    }

    /// Delete a task; the audit entry keeps its former project id.
    pub async fn delete(
        &self,
        actor_id: DbId,
        task_id: DbId,
        ctx: &RequestContext,
    ) -> Result<(), CoreError> {
        require_id("actor_id", actor_id)?;
        require_id("task_id", task_id)?;

        let mut tx = self.store.begin().await?;
        let actor = load_actor(&mut tx, actor_id).await?;
        let task = load_task(&mut tx, task_id).await?;

        let wrap =
            |e: StoreError| CoreError::unexpected(format!("Failed to delete task {task_id}"), e);
        tx.delete_task(task.id).await.map_err(wrap)?;

        AuditRecorder::record(
            &mut tx,
            &actor,
            actions::TASK_DELETED,
            format!("Task {} deleted from project {}", task.id, task.project_id),
            EntityKind::Task,
            ctx,
        )
        .await?;
        tx.commit().await.map_err(wrap)?;

        tracing::info!(task_id, project_id = task.project_id, "Task deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_all(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.store.list_tasks(TaskFilter::default()).await?)
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Task, CoreError> {
        require_id("task_id", id)?;
        self.store
            .find_task(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })
    }

    /// Tasks in `project_id` that `user_id` is responsible for.
    pub async fn find_by_user_and_project(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<Vec<Task>, CoreError> {
        self.find_for_user_in_project(user_id, project_id, None)
            .await
    }

    pub async fn find_by_user_status_and_project(
        &self,
        user_id: DbId,
        status: &str,
        project_id: DbId,
    ) -> Result<Vec<Task>, CoreError> {
        let status: TaskStatus = status.parse()?;
        self.find_for_user_in_project(user_id, project_id, Some(status))
            .await
    }

    async fn find_for_user_in_project(
        &self,
        user_id: DbId,
        project_id: DbId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, CoreError> {
        require_id("user_id", user_id)?;
        require_id("project_id", project_id)?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "User",
                id: user_id,
            });
        }
        if self.store.find_project(project_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }

        let filter = TaskFilter {
            status,
            responsible_id: Some(user_id),
            project_id: Some(project_id),
        };
        Ok(self.store.list_tasks(filter).await?)
    }

    // -----------------------------------------------------------------------
    // Overdue sweep
    // -----------------------------------------------------------------------

    /// Mark every task whose expected end has passed as `LATE`.
    pub async fn sweep_overdue(&self) -> Result<SweepReport, CoreError> {
        self.sweep_overdue_as_of(Utc::now().date_naive()).await
    }

    /// Sweep against an explicit calendar date, one transaction per row.
    pub async fn sweep_overdue_as_of(&self, today: Date) -> Result<SweepReport, CoreError> {
        let tasks = self.store.list_tasks(TaskFilter::default()).await?;
        let mut report = SweepReport {
            scanned: tasks.len(),
            ..SweepReport::default()
        };

        for task in tasks
            .iter()
            .filter(|t| t.is_overdue(today) && t.status != TaskStatus::Late)
        {
            match self.mark_late(task.id, today).await {
                Ok(true) => report.marked_late += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        task_id = task.id,
                        error = %e,
                        "Overdue sweep: failed to mark task late"
                    );
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            marked_late = report.marked_late,
            failed = report.failed,
            "Task overdue sweep finished"
        );
        Ok(report)
    }

    async fn mark_late(&self, id: DbId, today: Date) -> Result<bool, CoreError> {
        let mut tx = self.store.begin().await?;
        let Some(mut task) = tx.find_task(id).await? else {
            return Ok(false);
        };
        if !task.is_overdue(today) || task.status == TaskStatus::Late {
            return Ok(false);
        }
        task.status = TaskStatus::Late;
        tx.save_task(&task).await?;
        tx.commit().await?;
        Ok(true)
    }
}
