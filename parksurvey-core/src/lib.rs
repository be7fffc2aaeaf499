//! parksurvey-core: geo-index resolution and survey domain types
//!
//! - [`geo`]: lat/lng to H3 resolution-9 cells, grid distances, the reference (park) cell
//! - [`survey`]: payload contract and its validation into storable rows
//! - [`csv`]: export rendering
//! - [`config`]: startup configuration from the environment and `parksurvey.toml`

pub mod config;
pub mod csv;
pub mod error;
pub mod geo;
pub mod survey;

pub use error::{Result, SurveyError};
pub use geo::{grid_distance, resolve_cell, CellId, ReferenceCell, CELL_RESOLUTION};
pub use survey::{
    Education, Employment, MaritalStatus, NumKids, SurveyAnswers, SurveyPayload, SurveyResponse,
    SurveySubmission,
};
