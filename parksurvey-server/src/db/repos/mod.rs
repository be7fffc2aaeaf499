//! Repository implementations for database access
//!
//! - Upserts use ON CONFLICT on the primary key (no check-then-insert)
//! - Reads that must be consistent run in a single read-only transaction

pub mod responses;

pub use responses::{ResponseRepo, StoredResponse};
