//! Survey response endpoints

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parksurvey_core::{SurveyPayload, SurveySubmission};

use super::cells::CellResponse;
use crate::db::ResponseRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::state::AppState;

/// Download name offered to the browser
const EXPORT_FILE_NAME: &str = "survey_responses.csv";

/// POST /api/responses - store an already-derived payload
async fn upsert_response(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SurveyPayload>,
) -> Result<StatusCode, ApiError> {
    let response = payload.validate()?;
    ResponseRepo::new(state.pool()).upsert(&response).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/submissions - derive cell and park distance, then store
async fn submit(
    State(state): State<AppState>,
    ValidJson(submission): ValidJson<SurveySubmission>,
) -> Result<(StatusCode, Json<CellResponse>), ApiError> {
    let payload = submission.into_payload(state.reference())?;
    let response = payload.validate()?;
    ResponseRepo::new(state.pool()).upsert(&response).await?;

    tracing::info!(h3index = %response.h3index, "survey submission stored");

    Ok((
        StatusCode::CREATED,
        Json(CellResponse {
            h3_index: response.h3index.to_string(),
            hex_distance_to_park: response.hex_distance_to_park,
        }),
    ))
}

/// GET /api/responses/export.csv - full dataset as a CSV attachment
async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers)?;

    let body = ResponseRepo::new(state.pool()).export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => {
            tracing::warn!("rejected export request with missing or invalid token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Response routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/responses", post(upsert_response))
        .route("/api/submissions", post(submit))
        .route("/api/responses/export.csv", get(export_csv))
}
