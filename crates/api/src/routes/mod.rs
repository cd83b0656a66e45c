pub mod health;
pub mod matches;
pub mod notification;
pub mod payments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /matches                     list, propose, transition / reprice, delete
/// /matches/{id}                get
///
/// /payments                    list, create, update status / refs
/// /payments/webhook            processor callback (signed)
/// /payments/{id}               get
///
/// /notifications               list
/// /notifications/read-all      mark all read (POST)
/// /notifications/unread-count  unread count
/// /notifications/{id}/read     mark read (POST)
/// /notifications/{id}          delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/matches", matches::router())
        .nest("/payments", payments::router())
        .nest("/notifications", notification::router())
}
