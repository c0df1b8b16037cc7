use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Audit routes mounted at `/audit-logs`.
///
/// ```text
/// GET /?user_id=&entity_kind=&limit=&offset=  -> query_audit_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::query_audit_logs))
}
