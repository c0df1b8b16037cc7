//! Project row model.

use projman_core::project::Project;
use projman_core::status::{ProjectStatus, StatusId};
use projman_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

use crate::models::decode_error;

/// A row from `projects`, with `member_ids` aggregated from
/// `project_members`.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub created_at: Timestamp,
    pub status_id: StatusId,
    pub manager_id: Option<DbId>,
    pub creator_id: Option<DbId>,
    pub budget: f64,
    pub priority: Option<String>,
    pub completion_pct: i32,
    pub member_ids: Vec<DbId>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = sqlx::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::from_id(row.status_id)
            .ok_or_else(|| decode_error(format!("unknown project status id {}", row.status_id)))?;
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            expected_end_date: row.expected_end_date,
            created_at: row.created_at,
            status,
            manager_id: row.manager_id,
            creator_id: row.creator_id,
            budget: row.budget,
            priority: row.priority,
            completion_pct: row.completion_pct,
            member_ids: row.member_ids.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn row(status_id: StatusId) -> ProjectRow {
        ProjectRow {
            id: 1,
            name: "Apollo".into(),
            description: "Moonshot".into(),
            start_date: Date::from_ymd_opt(2026, 1, 1).unwrap(),
            expected_end_date: Date::from_ymd_opt(2026, 6, 1).unwrap(),
            created_at: chrono::Utc::now(),
            status_id,
            manager_id: Some(2),
            creator_id: Some(3),
            budget: 10.5,
            priority: None,
            completion_pct: 20,
            member_ids: vec![5, 4, 5],
        }
    }

    #[test]
    fn converts_status_and_dedupes_members() {
        let project = Project::try_from(row(2)).unwrap();
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.member_ids.into_iter().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn unknown_status_id_is_a_decode_error() {
        assert_matches!(Project::try_from(row(42)), Err(sqlx::Error::Decode(_)));
    }
}
