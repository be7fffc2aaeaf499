//! API error types with IntoResponse
//!
//! Client mistakes get a specific message. Storage failures are logged and
//! answered with a generic retry prompt.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parksurvey_core::SurveyError;
use serde_json::json;

use crate::db::DbError;

/// Shown to respondents whenever their submission could not be stored
pub const RETRY_MESSAGE: &str =
    "An error occurred while submitting your responses, please try submitting again";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Invalid cell, coordinate or payload field (400)
    Invalid(SurveyError),

    /// Missing or wrong export token (401)
    Unauthorized,

    /// Pool exhausted, retry later (503)
    Busy,

    /// Storage or configuration failure (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Invalid(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "invalid credentials, please get in touch with the research team for access"
                }),
            ),
            Self::Busy => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "busy",
                    "message": RETRY_MESSAGE
                }),
            ),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": RETRY_MESSAGE
                    }),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, header::HeaderValue::from_static("1"));
        }
        response
    }
}

impl From<SurveyError> for ApiError {
    fn from(e: SurveyError) -> Self {
        if e.is_client_error() {
            Self::Invalid(e)
        } else {
            Self::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::PoolExhausted { waited } => {
                tracing::warn!(?waited, "connection pool exhausted");
                Self::Busy
            }
            DbError::Invalid(e) => Self::from(e),
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
