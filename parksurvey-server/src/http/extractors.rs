//! Custom Axum extractors
//!
//! Wrap `Json` and `Query` so a body or query string that does not
//! deserialize is answered as a 400 [`ApiError::Invalid`] in the usual JSON
//! error shape. The serde message is logged, not returned.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use parksurvey_core::SurveyError;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body that rejects with [`ApiError`]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

/// Query string that rejects with [`ApiError`]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection)?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "rejected request body");

    let reason = match rejection {
        JsonRejection::JsonDataError(_) => {
            "a required field is missing or a field has an unrecognised value"
        }
        JsonRejection::JsonSyntaxError(_) => "body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "expected Content-Type: application/json",
        _ => "request body could not be read",
    };
    ApiError::Invalid(SurveyError::validation("body", reason))
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "rejected query string");
    ApiError::Invalid(SurveyError::validation(
        "query",
        "a parameter is missing or malformed",
    ))
}
