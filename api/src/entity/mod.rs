//! SeaORM entities
//!
//! Table definitions for the tables this service reads.

pub mod events;
