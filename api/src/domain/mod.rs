//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Feed configuration and inbound records
//! - `ports`: Trait definitions for external dependencies
//! - `validation`: Rules a feed options document must satisfy

pub mod entities;
pub mod ports;
pub mod validation;
