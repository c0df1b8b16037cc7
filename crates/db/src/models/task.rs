//! Task row model.

use projman_core::status::{StatusId, TaskStatus};
use projman_core::task::Task;
use projman_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

use crate::models::decode_error;

/// A row from `tasks`, with `responsible_ids` aggregated from
/// `task_responsibles`.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub status_id: StatusId,
    pub completion_pct: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub responsible_ids: Vec<DbId>,
}

impl TryFrom<TaskRow> for Task {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::from_id(row.status_id)
            .ok_or_else(|| decode_error(format!("unknown task status id {}", row.status_id)))?;
        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            expected_end_date: row.expected_end_date,
            status,
            completion_pct: row.completion_pct,
            completed_at: row.completed_at,
            created_at: row.created_at,
            responsible_ids: row.responsible_ids.into_iter().collect(),
        })
    }
}
