//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The port traits are small, so the in-memory stores below implement them
//! directly instead of going through a mocking framework.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
