//! Carryshare event bus.
//!
//! Lifecycle handlers publish a [`PlatformEvent`] after their transaction
//! commits; subscribers (the notification router in the API crate) turn
//! events into side effects. Nothing published here can affect the outcome
//! of the operation that produced it.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the canonical domain event envelope.

pub mod bus;

pub use bus::{EventBus, PlatformEvent};
