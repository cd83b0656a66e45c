//! Notification dispatch.
//!
//! The [`NotificationRouter`] subscribes to the event bus and writes one
//! notification row per event recipient. It runs after the lifecycle
//! transaction has committed, so nothing it does can undo a state change.

pub mod router;

pub use router::NotificationRouter;
