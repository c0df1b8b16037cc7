//! Repository for the append-only `audit_logs` table.

use projman_core::audit::{AuditLog, AuditLogFilter, NewAuditLog};
use sqlx::PgConnection;

use crate::models::audit::AuditLogRow;

const COLUMNS: &str = "id, occurred_at, user_id, action, detail, entity_kind, \
     client_ip, user_agent, origin, session_id";

/// Insert and query operations only; entries are never updated or deleted.
pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn create(conn: &mut PgConnection, entry: &NewAuditLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_logs
                (occurred_at, user_id, action, detail, entity_kind,
                 client_ip, user_agent, origin, session_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.occurred_at)
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(entry.entity_kind.as_str())
        .bind(&entry.context.client_ip)
        .bind(&entry.context.user_agent)
        .bind(&entry.context.origin)
        .bind(&entry.context.session_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Newest entries first, filtered and paginated.
    pub async fn query(
        conn: &mut PgConnection,
        filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::TEXT IS NULL OR entity_kind = $2)
             ORDER BY occurred_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, AuditLogRow>(&query)
            .bind(filter.user_id)
            .bind(filter.entity_kind.map(|k| k.as_str()))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(AuditLog::from).collect())
    }
}
