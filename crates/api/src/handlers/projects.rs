//! Handlers for the `/projects` resource.
//!
//! Mutations pass the authenticated user as the audit actor.

use axum::extract::State;
use axum::http::StatusCode;
use projman_core::project::{Project, ProjectInput};
use projman_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::request_context::RequestMeta;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    Ok(ApiResponse::ok(state.projects.find_all().await?))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Project>> {
    Ok(ApiResponse::ok(state.projects.find_by_id(id).await?))
}

/// GET /api/v1/projects/status/{status}
pub async fn list_by_status(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    Ok(ApiResponse::ok(state.projects.find_by_status(&status).await?))
}

/// GET /api/v1/projects/mine
///
/// Projects where the caller is a member, the manager or the creator.
pub async fn list_mine(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    Ok(ApiResponse::ok(
        state.projects.find_for_user(user.user_id).await?,
    ))
}

/// GET /api/v1/projects/mine/status/{status}
pub async fn list_mine_by_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    let projects = state
        .projects
        .find_for_user_by_status(user.user_id, &status)
        .await?;
    Ok(ApiResponse::ok(projects))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Json(input): Json<ProjectInput>,
) -> AppResult<ApiResponse<Project>> {
    let project = state.projects.create(user.user_id, input, &ctx).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
    Json(input): Json<ProjectInput>,
) -> AppResult<ApiResponse<Project>> {
    let project = state.projects.update(user.user_id, id, input, &ctx).await?;
    Ok(ApiResponse::ok(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    state.projects.delete(user.user_id, id, &ctx).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Project deleted"))
}

/// POST /api/v1/projects/{id}/members/{user_id}
pub async fn add_member(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<ApiResponse<Project>> {
    let project = state
        .projects
        .add_member(user.user_id, id, member_id, &ctx)
        .await?;
    Ok(ApiResponse::ok(project))
}

/// DELETE /api/v1/projects/{id}/members/{user_id}
pub async fn remove_member(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<ApiResponse<Project>> {
    let project = state
        .projects
        .remove_member(user.user_id, id, member_id, &ctx)
        .await?;
    Ok(ApiResponse::ok(project))
}

/// PUT /api/v1/projects/{id}/manager/{user_id}
pub async fn set_manager(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path((id, manager_id)): Path<(DbId, DbId)>,
) -> AppResult<ApiResponse<Project>> {
    let project = state
        .projects
        .set_manager(user.user_id, id, manager_id, &ctx)
        .await?;
    Ok(ApiResponse::ok(project))
}
