//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod record_store;


pub use record_store::PostgresRecordStore;
