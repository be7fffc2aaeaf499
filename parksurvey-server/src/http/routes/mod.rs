//! Route handlers organized by resource

pub mod cells;
pub mod health;
pub mod responses;
