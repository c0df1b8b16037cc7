//! Repository for the `tasks` and `task_responsibles` tables.

use projman_core::task::{NewTask, Task, TaskFilter};
use projman_core::types::DbId;
use sqlx::PgConnection;

use crate::models::task::TaskRow;

const COLUMNS: &str = "t.id, t.project_id, t.name, t.description, t.start_date, \
     t.expected_end_date, t.status_id, t.completion_pct, t.completed_at, t.created_at, \
     ARRAY(SELECT r.user_id FROM task_responsibles r WHERE r.task_id = t.id ORDER BY r.user_id) \
     AS responsible_ids";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task together with its initial responsible set.
    pub async fn create(conn: &mut PgConnection, input: &NewTask) -> Result<Task, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO tasks
                (project_id, name, description, start_date, expected_end_date, status_id,
                 completion_pct, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(input.project_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_date)
        .bind(input.expected_end_date)
        .bind(input.status.id())
        .bind(input.completion_pct)
        .bind(input.created_at)
        .fetch_one(&mut *conn)
        .await?;

        let responsible_ids: Vec<DbId> = input.responsible_ids.iter().copied().collect();
        Self::replace_responsibles(conn, id, &responsible_ids).await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1 FOR UPDATE OF t");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    pub async fn list(conn: &mut PgConnection, filter: TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t
             WHERE ($1::SMALLINT IS NULL OR t.status_id = $1)
               AND ($2::BIGINT IS NULL
                    OR EXISTS (SELECT 1 FROM task_responsibles tr
                               WHERE tr.task_id = t.id AND tr.user_id = $2))
               AND ($3::BIGINT IS NULL OR t.project_id = $3)
             ORDER BY t.expected_end_date, t.id"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(filter.status.map(|s| s.id()))
            .bind(filter.responsible_id)
            .bind(filter.project_id)
            .fetch_all(conn)
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    /// Write every column and replace the responsible set.
    pub async fn update(conn: &mut PgConnection, task: &Task) -> Result<Task, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET
                project_id = $2,
                name = $3,
                description = $4,
                start_date = $5,
                expected_end_date = $6,
                status_id = $7,
                completion_pct = $8,
                completed_at = $9
             WHERE id = $1",
        )
        .bind(task.id)
        .bind(task.project_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.start_date)
        .bind(task.expected_end_date)
        .bind(task.status.id())
        .bind(task.completion_pct)
        .bind(task.completed_at)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let responsible_ids: Vec<DbId> = task.responsible_ids.iter().copied().collect();
        Self::replace_responsibles(conn, task.id, &responsible_ids).await?;

        Self::find_by_id(conn, task.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn replace_responsibles(
        conn: &mut PgConnection,
        task_id: DbId,
        user_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM task_responsibles WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;
        if !user_ids.is_empty() {
            sqlx::query(
                "INSERT INTO task_responsibles (task_id, user_id)
                 SELECT $1, UNNEST($2::BIGINT[])",
            )
            .bind(task_id)
            .bind(user_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every task of a project. Returns the number of rows removed.
    pub async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
