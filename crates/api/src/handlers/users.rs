//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use projman_core::types::DbId;
use projman_core::user::{User, UserPerformance, UserUpdate};

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::request_context::RequestMeta;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<User>>> {
    Ok(ApiResponse::ok(state.users.find_all().await?))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(state.users.find_by_id(id).await?))
}

/// GET /api/v1/users/by-project/{project_id}
pub async fn list_by_project(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<User>>> {
    Ok(ApiResponse::ok(state.users.find_by_project(project_id).await?))
}

/// GET /api/v1/users/{id}/performance
pub async fn performance(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserPerformance>> {
    Ok(ApiResponse::ok(state.users.performance(id).await?))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
    Json(input): Json<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    let updated = state.users.update(user.user_id, id, input, &ctx).await?;
    Ok(ApiResponse::ok(updated))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    state.users.delete(user.user_id, id, &ctx).await?;
    Ok(ApiResponse::message(StatusCode::OK, "User deleted"))
}
