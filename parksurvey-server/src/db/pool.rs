//! Database connection pool management
//!
//! The pool is built once during startup and handed to every component
//! through `AppState`; nothing looks it up globally.
//!
//! # Checkout policy
//!
//! At most `max_connections` (default 30) connections are checked out at
//! once. A checkout beyond that waits up to `acquire_timeout` (default 5 s)
//! for a release, then fails with [`DbError::PoolExhausted`]. A timeout
//! while the pool is below its limit means connections could not be opened
//! and is reported as [`DbError::Storage`].

use std::str::FromStr;
use std::time::Duration;

use parksurvey_core::config::PoolSettings;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};

use super::DbError;

/// Reported to PostgreSQL as `application_name`
const APPLICATION_NAME: &str = "parksurvey";

/// Shared handle to the connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SurveyPool {
    inner: PgPool,
    acquire_timeout: Duration,
}

impl SurveyPool {
    /// Wrap an already-built pool.
    pub fn from_pg(inner: PgPool, acquire_timeout: Duration) -> Self {
        Self {
            inner,
            acquire_timeout,
        }
    }

    /// Check out a connection, waiting at most the acquire timeout.
    ///
    /// The connection goes back to the pool when dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        self.inner
            .acquire()
            .await
            .map_err(|e| self.checkout_error(e))
    }

    /// Check out a connection and open a transaction on it.
    ///
    /// Dropping the transaction without committing rolls it back and
    /// returns the connection to the pool.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        self.inner
            .begin()
            .await
            .map_err(|e| self.checkout_error(e))
    }

    fn checkout_error(&self, err: sqlx::Error) -> DbError {
        let saturated = self.checked_out() >= self.max_connections();
        DbError::from_checkout(err, self.acquire_timeout, saturated)
    }

    /// Close every pooled connection.
    ///
    /// Safe to call once at shutdown (repeat calls are no-ops). If
    /// checkouts are still outstanding, new checkouts fail immediately with
    /// `PoolClosed` and this call waits until every outstanding connection
    /// has been returned and closed; in-flight statements are not aborted.
    pub async fn close_all(&self) {
        if self.inner.is_closed() {
            return;
        }
        let outstanding = self.checked_out();
        if outstanding > 0 {
            tracing::warn!(outstanding, "closing pool with connections still checked out");
        }
        self.inner.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }

    /// Open connections, idle or checked out.
    pub fn size(&self) -> u32 {
        self.inner.size()
    }

    /// Connections currently checked out.
    pub fn checked_out(&self) -> u32 {
        self.inner.size().saturating_sub(self.inner.num_idle() as u32)
    }

    /// Upper bound on open connections.
    pub fn max_connections(&self) -> u32 {
        self.inner.options().get_max_connections()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }
}

/// Create the PostgreSQL connection pool, connecting eagerly.
///
/// # Errors
///
/// Returns [`DbError::Configuration`] if the URL is empty or unparsable or
/// the server cannot be reached.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database_url, &config.pool).await?;
/// ```
pub async fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<SurveyPool, DbError> {
    let connect = connect_options(database_url, settings)?;
    let pool = pool_options(settings)
        .connect_with(connect)
        .await
        .map_err(|e| DbError::configuration(format!("cannot reach database: {e}")))?;

    tracing::info!(
        min = settings.min_connections,
        max = settings.max_connections,
        "PostgreSQL connection pool created"
    );

    Ok(SurveyPool::from_pg(pool, settings.acquire_timeout()))
}

/// Create the pool without connecting; connections open on first checkout.
pub fn create_lazy_pool(database_url: &str, settings: &PoolSettings) -> Result<SurveyPool, DbError> {
    let connect = connect_options(database_url, settings)?;
    let pool = pool_options(settings).connect_lazy_with(connect);
    Ok(SurveyPool::from_pg(pool, settings.acquire_timeout()))
}

fn connect_options(database_url: &str, settings: &PoolSettings) -> Result<PgConnectOptions, DbError> {
    if database_url.trim().is_empty() {
        return Err(DbError::configuration("database URL is empty"));
    }

    let options = PgConnectOptions::from_str(database_url)
        .map_err(|e| DbError::configuration(format!("invalid database URL: {e}")))?;

    // Bounded statement execution; expiry surfaces as a storage error
    Ok(options
        .application_name(APPLICATION_NAME)
        .options([("statement_timeout", settings.statement_timeout_ms.to_string())]))
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
}
