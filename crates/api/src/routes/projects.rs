//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /mine                          -> list_mine
/// GET    /mine/status/{status}          -> list_mine_by_status
/// GET    /status/{status}               -> list_by_status
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// POST   /{id}/members/{user_id}        -> add_member
/// DELETE /{id}/members/{user_id}        -> remove_member
/// PUT    /{id}/manager/{user_id}        -> set_manager
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/mine", get(projects::list_mine))
        .route("/mine/status/{status}", get(projects::list_mine_by_status))
        .route("/status/{status}", get(projects::list_by_status))
        .route(
            "/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/{id}/members/{user_id}",
            post(projects::add_member).delete(projects::remove_member),
        )
        .route("/{id}/manager/{user_id}", put(projects::set_manager))
}
