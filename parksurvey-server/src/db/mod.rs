//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - One pool built at startup and injected, never a global
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Every write runs in a transaction that is rolled back on failure
//! - Connections are RAII guards, released on every exit path

pub mod error;
pub mod pool;
pub mod repos;
pub mod schema;

pub use error::DbError;
pub use pool::{create_lazy_pool, create_pool, SurveyPool};
pub use repos::*;
pub use schema::ensure_schema;
