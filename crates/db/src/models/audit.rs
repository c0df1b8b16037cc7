//! Audit log row model. Rows are immutable once written.

use projman_core::audit::AuditLog;
use projman_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    pub id: DbId,
    pub occurred_at: Timestamp,
    pub user_id: DbId,
    pub action: String,
    pub detail: String,
    pub entity_kind: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub origin: Option<String>,
    pub session_id: Option<String>,
}

impl From<AuditLogRow> for AuditLog {
    fn from(row: AuditLogRow) -> Self {
        AuditLog {
            id: row.id,
            occurred_at: row.occurred_at,
            user_id: row.user_id,
            action: row.action,
            detail: row.detail,
            entity_kind: row.entity_kind,
            client_ip: row.client_ip,
            user_agent: row.user_agent,
            origin: row.origin,
            session_id: row.session_id,
        }
    }
}
