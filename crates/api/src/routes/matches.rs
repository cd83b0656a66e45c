//! Route definitions for the `/matches` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::matches;
use crate::state::AppState;

/// Routes mounted at `/matches`.
///
/// ```text
/// GET    /?status=&limit=&offset=   -> list_matches
/// POST   /                          -> propose_match
/// PUT    /                          -> update_match
/// DELETE /?id=                      -> delete_match
/// GET    /{id}                      -> get_match
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(matches::list_matches)
                .post(matches::propose_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/{id}", get(matches::get_match))
}
