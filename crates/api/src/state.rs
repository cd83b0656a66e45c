use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Requests share nothing mutable through it: every lifecycle operation runs
/// in its own database transaction.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: carryshare_db::DbPool,
    /// Server configuration (JWT secret, webhook secret, timeouts).
    pub config: Arc<ServerConfig>,
    /// Post-commit outbox for match/payment events.
    pub event_bus: Arc<carryshare_events::EventBus>,
}
