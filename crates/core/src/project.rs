//! Project entity, its input payload, and the completion-to-status rule.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::diff::ChangeSet;
use crate::status::ProjectStatus;
use crate::types::{Date, DbId, Timestamp};
use crate::validation::{Validatable, Violations};

pub const MAX_NAME_LENGTH: u64 = 255;
pub const MAX_PRIORITY_LENGTH: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub created_at: Timestamp,
    pub status: ProjectStatus,
    pub manager_id: Option<DbId>,
    pub creator_id: Option<DbId>,
    pub budget: f64,
    pub priority: Option<String>,
    pub completion_pct: i32,
    pub member_ids: BTreeSet<DbId>,
}

/// A project row ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub created_at: Timestamp,
    pub status: ProjectStatus,
    pub manager_id: Option<DbId>,
    pub creator_id: DbId,
    pub budget: f64,
    pub priority: Option<String>,
    pub completion_pct: i32,
}

/// Client payload for creating or updating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    pub name: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
    pub manager_id: Option<DbId>,
    pub budget: f64,
    pub priority: Option<String>,
    pub completion_pct: i32,
}

impl Validatable for ProjectInput {
    const ENTITY: &'static str = "Project";

    fn collect_violations(&self, v: &mut Violations) {
        v.not_blank("name", &self.name)
            .max_length("name", &self.name, MAX_NAME_LENGTH)
            .not_blank("description", &self.description)
            .required("start_date", &self.start_date)
            .required("expected_end_date", &self.expected_end_date)
            .non_negative("budget", self.budget)
            .range("completion_pct", self.completion_pct, 0, 100);
        if let Some(priority) = &self.priority {
            v.max_length("priority", priority, MAX_PRIORITY_LENGTH);
        }
    }
}

/// Filter for project listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Member, manager, or creator of the project.
    pub participant_id: Option<DbId>,
}

/// Status implied by a completion percentage.
///
/// 100 completes the project and anything in between is in progress. At 0
/// the project falls back to `Created`, except that a late project stays late
/// until its percentage moves.
pub fn derive_status(current: ProjectStatus, completion_pct: i32) -> ProjectStatus {
    match completion_pct {
        100 => ProjectStatus::Completed,
        1..=99 => ProjectStatus::InProgress,
        _ if current == ProjectStatus::Late => ProjectStatus::Late,
        _ => ProjectStatus::Created,
    }
}

impl Project {
    /// Whether the expected end lies strictly before `today`.
    pub fn is_overdue(&self, today: Date) -> bool {
        self.expected_end_date < today
    }

    /// Field-by-field comparison used for the update audit detail.
    pub fn changes(old: &Project, new: &Project) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes
            .compare("Name", &old.name, &new.name)
            .compare("Description", &old.description, &new.description)
            .compare("Start date", &old.start_date, &new.start_date)
            .compare("Expected end date", &old.expected_end_date, &new.expected_end_date)
            .compare("Manager", &old.manager_id, &new.manager_id)
            .compare("Budget", &old.budget, &new.budget)
            .compare("Priority", &old.priority, &new.priority)
            .compare("Completion", &old.completion_pct, &new.completion_pct)
            .compare("Status", &old.status, &new.status);
        changes
    }
}
