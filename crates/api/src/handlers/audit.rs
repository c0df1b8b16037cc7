//! Handler for browsing the audit trail.

use axum::extract::State;
use projman_core::audit::{clamp_limit, AuditLog, AuditLogFilter, EntityKind};
use projman_core::error::CoreError;
use projman_core::store::Store;
use projman_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::Query;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for `GET /audit-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub user_id: Option<DbId>,
    pub entity_kind: Option<EntityKind>,
    /// Page size (default 50, capped at 500).
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/audit-logs
///
/// Newest entries first.
pub async fn query_audit_logs(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AuditLogQuery>,
) -> AppResult<ApiResponse<Vec<AuditLog>>> {
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::BadRequest("offset must not be negative".into()));
    }

    let filter = AuditLogFilter {
        user_id: params.user_id,
        entity_kind: params.entity_kind,
        limit: clamp_limit(params.limit),
        offset,
    };
    let logs = state
        .store
        .list_audit_logs(&filter)
        .await
        .map_err(CoreError::from)?;
    Ok(ApiResponse::ok(logs))
}
