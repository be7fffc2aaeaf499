//! parksurvey-server: storage and HTTP API for the park survey
//!
//! - [`db`]: connection pool, `people_info` schema, upsert and export
//! - [`http`]: axum router, error mapping and graceful shutdown

pub mod db;
pub mod http;
pub mod state;

pub use db::{create_pool, ensure_schema, DbError, ResponseRepo, SurveyPool};
pub use http::{build_router, run_server, ApiError, ServerConfig};
pub use state::AppState;
