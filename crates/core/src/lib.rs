//! Domain layer for the carryshare match/payment lifecycle engine.
//!
//! Everything in this crate is pure logic with no I/O: the closed status
//! enumerations and their transition tables, the authorization predicates
//! shared by both lifecycle managers, payload validation, and webhook
//! signature helpers.

pub mod error;
pub mod match_status;
pub mod notification_types;
pub mod payment_status;
pub mod policy;
pub mod types;
pub mod validation;
pub mod webhook;
