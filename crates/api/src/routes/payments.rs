//! Route definitions for the `/payments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /?status=&matchId=   -> list_payments
/// POST   /                    -> create_payment
/// PUT    /                    -> update_payment
/// POST   /webhook             -> payment_webhook (signature, no bearer token)
/// GET    /{id}                -> get_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(payments::list_payments)
                .post(payments::create_payment)
                .put(payments::update_payment),
        )
        .route("/webhook", post(payments::payment_webhook))
        .route("/{id}", get(payments::get_payment))
}
