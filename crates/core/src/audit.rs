//! Audit recorder: append-only entries describing who did what.
//!
//! Entries are written through the same [`StoreTx`] as the mutation they
//! describe, so the change and its audit row commit or roll back together.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::StoreTx;
use crate::types::{DbId, Timestamp};
use crate::user::User;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Action descriptions stored in [`AuditLog::action`].
pub mod actions {
    pub const USER_REGISTERED: &str = "User registered";
    pub const USER_LOGGED_IN: &str = "User logged in";
    pub const USER_UPDATED: &str = "User updated";
    pub const USER_DELETED: &str = "User deleted";

    pub const PROJECT_CREATED: &str = "Project created";
    pub const PROJECT_UPDATED: &str = "Project updated";
    pub const PROJECT_DELETED: &str = "Project deleted";
    pub const PROJECT_MEMBER_ADDED: &str = "Project member added";
    pub const PROJECT_MEMBER_REMOVED: &str = "Project member removed";
    pub const PROJECT_MANAGER_SET: &str = "Project manager set";

    pub const TASK_CREATED: &str = "Task created";
    pub const TASK_UPDATED: &str = "Task updated";
    pub const TASK_COMPLETED: &str = "Task completed";
    pub const TASK_DELETED: &str = "Task deleted";
    pub const TASK_RESPONSIBLES_ADDED: &str = "Task responsibles added";
    pub const TASK_RESPONSIBLES_REMOVED: &str = "Task responsibles removed";
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Project,
    Task,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::Task => "task",
        }
    }
}

/// Per-request metadata captured once at the HTTP boundary and passed
/// explicitly into every mutating operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub origin: Option<String>,
    pub session_id: Option<String>,
}

/// An audit entry ready to be appended.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub occurred_at: Timestamp,
    pub user_id: DbId,
    pub action: String,
    pub detail: String,
    pub entity_kind: EntityKind,
    pub context: RequestContext,
}

/// A stored audit entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
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

/// Filter for browsing the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub user_id: Option<DbId>,
    pub entity_kind: Option<EntityKind>,
    pub limit: i64,
    pub offset: i64,
}

/// Default page size for audit queries.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Upper bound for a single audit page.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Appends audit entries inside an open transaction.
pub struct AuditRecorder;

impl AuditRecorder {
    /// Append one entry for `actor`.
    ///
    /// A failed append is returned as [`CoreError::Unexpected`] with the
    /// store failure as its source; the caller's transaction must not commit.
    pub async fn record<T>(
        tx: &mut T,
        actor: &User,
        action: &str,
        detail: impl Into<String>,
        entity_kind: EntityKind,
        context: &RequestContext,
    ) -> Result<(), CoreError>
    where
        T: StoreTx + ?Sized,
    {
        let entry = NewAuditLog {
            occurred_at: chrono::Utc::now(),
            user_id: actor.id,
            action: action.to_string(),
            detail: detail.into(),
            entity_kind,
            context: context.clone(),
        };

        tx.append_audit(&entry).await.map_err(|e| {
            tracing::error!(error = %e, action, user_id = actor.id, "Failed to append audit entry");
            CoreError::unexpected(format!("Failed to record audit entry '{action}'"), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_wire_names() {
        assert_eq!(EntityKind::Project.as_str(), "project");
        assert_eq!(serde_json::to_string(&EntityKind::Task).unwrap(), "\"task\"");
    }

    #[test]
    fn clamp_limit_applies_default_and_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(25)), 25);
    }
}
