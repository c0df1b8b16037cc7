pub mod audit;
pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                        register (public)
/// /auth/login                                           login (public)
///
/// /users                                                list
/// /users/{id}                                           get, update, delete
/// /users/{id}/performance                               workload summary
/// /users/by-project/{project_id}                        project members
///
/// /projects                                             list, create
/// /projects/mine                                        caller's projects
/// /projects/mine/status/{status}                        caller's projects by status
/// /projects/status/{status}                            by status
/// /projects/{id}                                        get, update, delete
/// /projects/{id}/members/{user_id}                      add, remove member
/// /projects/{id}/manager/{user_id}                      set manager (PUT)
///
/// /tasks                                                list, create
/// /tasks/{id}                                           get, update, delete
/// /tasks/{id}/complete                                  complete (POST)
/// /tasks/{id}/responsibles                              add responsibles (POST)
/// /tasks/{id}/responsibles/remove                       remove responsibles (POST)
/// /tasks/user/{user_id}/project/{project_id}            by responsible and project
/// /tasks/user/{user_id}/project/{project_id}/status/{status}
///
/// /audit-logs                                           browse audit trail
/// ```
///
/// Everything except `/auth` requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/tasks", tasks::router())
        .nest("/audit-logs", audit::router())
}
