//! Handlers for the `/tasks` resource.

use axum::extract::State;
use axum::http::StatusCode;
use projman_core::task::{Task, TaskInput};
use projman_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::request_context::RequestMeta;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /tasks`.
///
/// `responsible_id` defaults to the caller.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(flatten)]
    pub task: TaskInput,
    #[serde(default)]
    pub responsible_id: Option<DbId>,
}

/// Request body for the bulk responsible endpoints.
#[derive(Debug, Deserialize)]
pub struct ResponsiblesRequest {
    pub user_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    Ok(ApiResponse::ok(state.tasks.find_all().await?))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Task>> {
    Ok(ApiResponse::ok(state.tasks.find_by_id(id).await?))
}

/// GET /api/v1/tasks/user/{user_id}/project/{project_id}
pub async fn list_by_user_and_project(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((user_id, project_id)): Path<(DbId, DbId)>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    let tasks = state
        .tasks
        .find_by_user_and_project(user_id, project_id)
        .await?;
    Ok(ApiResponse::ok(tasks))
}

/// GET /api/v1/tasks/user/{user_id}/project/{project_id}/status/{status}
pub async fn list_by_user_status_and_project(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((user_id, project_id, status)): Path<(DbId, DbId, String)>,
) -> AppResult<ApiResponse<Vec<Task>>> {
    let tasks = state
        .tasks
        .find_by_user_status_and_project(user_id, &status, project_id)
        .await?;
    Ok(ApiResponse::ok(tasks))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
///
/// Only the manager of the target project may create tasks in it.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<ApiResponse<Task>> {
    let responsible_id = input.responsible_id.unwrap_or(user.user_id);
    let task = state
        .tasks
        .create(user.user_id, input.task, responsible_id, &ctx)
        .await?;
    Ok(ApiResponse::created(task))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
    Json(input): Json<TaskInput>,
) -> AppResult<ApiResponse<Task>> {
    let task = state.tasks.update(user.user_id, id, input, &ctx).await?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/v1/tasks/{id}/complete
pub async fn complete(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Task>> {
    let task = state.tasks.complete(user.user_id, id, &ctx).await?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/v1/tasks/{id}/responsibles
pub async fn add_responsibles(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
    Json(input): Json<ResponsiblesRequest>,
) -> AppResult<ApiResponse<Task>> {
    let task = state
        .tasks
        .add_responsibles(user.user_id, id, &input.user_ids, &ctx)
        .await?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/v1/tasks/{id}/responsibles/remove
pub async fn remove_responsibles(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
    Json(input): Json<ResponsiblesRequest>,
) -> AppResult<ApiResponse<Task>> {
    let task = state
        .tasks
        .remove_responsibles(user.user_id, id, &input.user_ids, &ctx)
        .await?;
    Ok(ApiResponse::ok(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    state.tasks.delete(user.user_id, id, &ctx).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Task deleted"))
}
