//! Feed authorization
//!
//! Feeds are gated by shared secrets carried in the request, not by sessions.

pub mod secret_gate;

pub use secret_gate::authorize;
