/// Structured error types for parksurvey-core.
///
/// Library crates get structured, composable errors; the `parksurvey`
/// binary wraps them with `anyhow` context.
use thiserror::Error;

/// Main error type for parksurvey-core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveyError {
    /// Startup configuration is missing or unusable. Fatal.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Malformed cell id, wrong resolution, or cells with no defined distance
    #[error("Invalid cell '{value}': {reason}")]
    InvalidCell { value: String, reason: String },

    /// Latitude/longitude outside the valid range or not finite
    #[error("Invalid coordinate ({lat}, {lng}): {reason}")]
    InvalidCoordinate { lat: f64, lng: f64, reason: String },

    /// A payload field failed boundary validation
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

/// Result type alias for parksurvey-core operations
pub type Result<T> = std::result::Result<T, SurveyError>;

impl SurveyError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an invalid cell error
    pub fn invalid_cell(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCell {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid coordinate error
    pub fn invalid_coordinate(lat: f64, lng: f64, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            lat,
            lng,
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by client input rather than the deployment
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }
}
