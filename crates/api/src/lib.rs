//! Carryshare API server library.
//!
//! Exposes the building blocks (config, state, error handling, identity
//! gate, match/payment lifecycle managers, routes, notification router) so
//! integration tests and the binary entrypoint can both access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
