//! Application state shared across handlers

use std::sync::Arc;

use parksurvey_core::ReferenceCell;

use crate::db::SurveyPool;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SurveyPool,
    reference: ReferenceCell,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(pool: SurveyPool, reference: ReferenceCell, admin_token: Option<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                reference,
                admin_token,
            }),
        }
    }

    pub fn pool(&self) -> &SurveyPool {
        &self.inner.pool
    }

    /// The park cell distances are measured against
    pub fn reference(&self) -> &ReferenceCell {
        &self.inner.reference
    }

    /// Bearer token guarding the CSV export, if configured
    pub fn admin_token(&self) -> Option<&str> {
        self.inner.admin_token.as_deref()
    }
}
