//! Task entity, its input payload, and completion semantics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::diff::ChangeSet;
use crate::status::TaskStatus;
use crate::types::{Date, DbId, Timestamp};
use crate::validation::{Validatable, Violations};

pub const MAX_NAME_LENGTH: u64 = 255;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub status: TaskStatus,
    pub completion_pct: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub responsible_ids: BTreeSet<DbId>,
}

/// A task row ready to be inserted, with its first responsible user.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub status: TaskStatus,
    pub completion_pct: i32,
    pub created_at: Timestamp,
    pub responsible_ids: BTreeSet<DbId>,
}

/// Client payload for creating or updating a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskInput {
    pub name: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
    pub project_id: Option<DbId>,
    pub completion_pct: i32,
}

fn content_rules(v: &mut Violations, name: &str, description: &str, completion_pct: i32) {
    v.not_blank("name", name)
        .max_length("name", name, MAX_NAME_LENGTH)
        .not_blank("description", description)
        .range("completion_pct", completion_pct, 0, 100);
}

impl Validatable for TaskInput {
    const ENTITY: &'static str = "Task";

    fn collect_violations(&self, v: &mut Violations) {
        content_rules(v, &self.name, &self.description, self.completion_pct);
        v.required("start_date", &self.start_date)
            .required("expected_end_date", &self.expected_end_date)
            .required("project_id", &self.project_id);
    }
}

/// Stored tasks are re-checked before completion.
impl Validatable for Task {
    const ENTITY: &'static str = "Task";

    fn collect_violations(&self, v: &mut Violations) {
        content_rules(v, &self.name, &self.description, self.completion_pct);
    }
}

/// Filter for task listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub responsible_id: Option<DbId>,
    pub project_id: Option<DbId>,
}

impl Task {
    /// Apply a new completion percentage.
    ///
    /// 100 completes the task and stamps `now`; anything lower clears the
    /// completion date, with 0 meaning the task is pending again.
    pub fn set_completion(&mut self, completion_pct: i32, now: Timestamp) {
        self.completion_pct = completion_pct;
        match completion_pct {
            100 => {
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
            }
            1..=99 => {
                self.status = TaskStatus::InProgress;
                self.completed_at = None;
            }
            _ => {
                self.status = TaskStatus::Pending;
                self.completed_at = None;
            }
        }
    }

    /// Force completion regardless of the percentage.
    pub fn complete(&mut self, now: Timestamp) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        self.expected_end_date < today
    }

    pub fn changes(old: &Task, new: &Task) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes
            .compare("Name", &old.name, &new.name)
            .compare("Description", &old.description, &new.description)
            .compare("Start date", &old.start_date, &new.start_date)
            .compare("Expected end date", &old.expected_end_date, &new.expected_end_date)
            .compare("Project", &old.project_id, &new.project_id)
            .compare("Completion", &old.completion_pct, &new.completion_pct)
            .compare("Status", &old.status, &new.status)
            .compare("Completed at", &old.completed_at, &new.completed_at);
        changes
    }
}
