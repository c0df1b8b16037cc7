//! Repository for the `users` table.

use projman_core::types::DbId;
use projman_core::user::{NewUser, User};
use sqlx::PgConnection;

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, registered_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(conn: &mut PgConnection, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, registered_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.registered_at)
            .fetch_one(conn)
            .await?;
        Ok(row.into())
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.map(User::from))
    }

    /// Fetch the users whose ids appear in `ids`; unknown ids are ignored.
    pub async fn find_many(conn: &mut PgConnection, ids: &[DbId]) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(conn)
            .await?;
        Ok(row.map(User::from))
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY name, id");
        let rows = sqlx::query_as::<_, UserRow>(&query).fetch_all(conn).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Members of a project, ordered by name.
    pub async fn list_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE id IN (SELECT user_id FROM project_members WHERE project_id = $1)
             ORDER BY name, id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(project_id)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn update(conn: &mut PgConnection, user: &User) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(conn)
            .await?;
        Ok(row.into())
    }

    /// Delete a user. Memberships and responsibilities cascade; manager and
    /// creator references are nulled by the schema.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
