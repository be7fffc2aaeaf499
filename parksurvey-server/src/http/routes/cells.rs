//! Cell lookup endpoint
//!
//! Lets the map form show which cell a click falls in and how far it is
//! from the park before anything is submitted.

use axum::{extract::State, routing::get, Json, Router};
use parksurvey_core::resolve_cell;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub lat: f64,
    pub lng: f64,
}

/// Derived columns for one location
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellResponse {
    pub h3_index: String,
    pub hex_distance_to_park: u32,
}

/// GET /api/cells/resolve?lat=..&lng=..
async fn resolve(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ResolveParams>,
) -> Result<Json<CellResponse>, ApiError> {
    let cell = resolve_cell(params.lat, params.lng)?;
    let distance = state.reference().distance_from(cell)?;

    Ok(Json(CellResponse {
        h3_index: cell.to_string(),
        hex_distance_to_park: distance,
    }))
}

/// Cell routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/cells/resolve", get(resolve))
}
