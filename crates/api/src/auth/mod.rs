//! Identity gate primitives.
//!
//! - [`jwt`] -- access-token validation (and minting for tests/tooling).

pub mod jwt;
