//! Storage error taxonomy

use std::time::Duration;

use parksurvey_core::SurveyError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Connection target unset, unparsable or unreachable. Fatal at startup.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Every connection stayed checked out for the whole acquire timeout.
    /// Transient: retry after backoff.
    #[error("connection pool exhausted: no connection freed within {waited:?}")]
    PoolExhausted { waited: Duration },

    /// Any read/write failure after checkout, including statement timeouts.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A row could not be converted to or from its column representation.
    #[error(transparent)]
    Invalid(#[from] SurveyError),
}

impl DbError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Map an error from a pool checkout.
    ///
    /// sqlx reports `PoolTimedOut` both when every connection stays checked
    /// out and when new connections keep failing to open. Only the first is
    /// [`DbError::PoolExhausted`]; `saturated` says whether the pool was at
    /// its connection limit when the wait ran out.
    pub(crate) fn from_checkout(err: sqlx::Error, waited: Duration, saturated: bool) -> Self {
        match err {
            sqlx::Error::PoolTimedOut if saturated => Self::PoolExhausted { waited },
            other => Self::Storage(other),
        }
    }

    /// Whether retrying later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}
