//! Repository for the `projects` and `project_members` tables.

use projman_core::project::{NewProject, Project, ProjectFilter};
use projman_core::types::DbId;
use sqlx::PgConnection;

use crate::models::project::ProjectRow;

/// Column list shared across queries; members are aggregated per row.
const COLUMNS: &str = "p.id, p.name, p.description, p.start_date, p.expected_end_date, \
     p.created_at, p.status_id, p.manager_id, p.creator_id, p.budget, p.priority, \
     p.completion_pct, \
     ARRAY(SELECT m.user_id FROM project_members m WHERE m.project_id = p.id ORDER BY m.user_id) \
     AS member_ids";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project (without members) and return the stored row.
    pub async fn create(conn: &mut PgConnection, input: &NewProject) -> Result<Project, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO projects
                (name, description, start_date, expected_end_date, created_at, status_id,
                 manager_id, creator_id, budget, priority, completion_pct)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_date)
        .bind(input.expected_end_date)
        .bind(input.created_at)
        .bind(input.status.id())
        .bind(input.manager_id)
        .bind(input.creator_id)
        .bind(input.budget)
        .bind(&input.priority)
        .bind(input.completion_pct)
        .fetch_one(&mut *conn)
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects p WHERE p.id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    /// Like [`Self::find_by_id`] but takes a row lock until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects p WHERE p.id = $1 FOR UPDATE OF p");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    /// List projects, newest first. A participant is a member, the manager,
    /// or the creator.
    pub async fn list(
        conn: &mut PgConnection,
        filter: ProjectFilter,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             WHERE ($1::SMALLINT IS NULL OR p.status_id = $1)
               AND ($2::BIGINT IS NULL
                    OR p.manager_id = $2
                    OR p.creator_id = $2
                    OR EXISTS (SELECT 1 FROM project_members pm
                               WHERE pm.project_id = p.id AND pm.user_id = $2))
             ORDER BY p.created_at DESC, p.id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(filter.status.map(|s| s.id()))
            .bind(filter.participant_id)
            .fetch_all(conn)
            .await?;
        rows.into_iter().map(Project::try_from).collect()
    }

    /// Write every column and replace the member set.
    pub async fn update(conn: &mut PgConnection, project: &Project) -> Result<Project, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET
                name = $2,
                description = $3,
                start_date = $4,
                expected_end_date = $5,
                status_id = $6,
                manager_id = $7,
                budget = $8,
                priority = $9,
                completion_pct = $10
             WHERE id = $1",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.expected_end_date)
        .bind(project.status.id())
        .bind(project.manager_id)
        .bind(project.budget)
        .bind(&project.priority)
        .bind(project.completion_pct)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let member_ids: Vec<DbId> = project.member_ids.iter().copied().collect();
        Self::replace_members(conn, project.id, &member_ids).await?;

        Self::find_by_id(conn, project.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn replace_members(
        conn: &mut PgConnection,
        project_id: DbId,
        member_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;
        if !member_ids.is_empty() {
            sqlx::query(
                "INSERT INTO project_members (project_id, user_id)
                 SELECT $1, UNNEST($2::BIGINT[])",
            )
            .bind(project_id)
            .bind(member_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Delete a project row. Its tasks must already be gone.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
