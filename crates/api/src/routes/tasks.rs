//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                                                    -> list
/// POST   /                                                    -> create
/// GET    /{id}                                                -> get_by_id
/// PUT    /{id}                                                -> update
/// DELETE /{id}                                                -> delete
/// POST   /{id}/complete                                       -> complete
/// POST   /{id}/responsibles                                   -> add_responsibles
/// POST   /{id}/responsibles/remove                            -> remove_responsibles
/// GET    /user/{user_id}/project/{project_id}                 -> list_by_user_and_project
/// GET    /user/{user_id}/project/{project_id}/status/{status} -> list_by_user_status_and_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list).post(tasks::create))
        .route(
            "/{id}",
            get(tasks::get_by_id)
                .put(tasks::update)
                .delete(tasks::delete),
        )
        .route("/{id}/complete", post(tasks::complete))
        .route("/{id}/responsibles", post(tasks::add_responsibles))
        .route("/{id}/responsibles/remove", post(tasks::remove_responsibles))
        .route(
            "/user/{user_id}/project/{project_id}",
            get(tasks::list_by_user_and_project),
        )
        .route(
            "/user/{user_id}/project/{project_id}/status/{status}",
            get(tasks::list_by_user_status_and_project),
        )
}
