use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                            -> list
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
/// GET    /{id}/performance            -> performance
/// GET    /by-project/{project_id}     -> list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route(
            "/{id}",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/{id}/performance", get(users::performance))
        .route("/by-project/{project_id}", get(users::list_by_project))
}
