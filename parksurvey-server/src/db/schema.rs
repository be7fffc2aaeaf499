//! `people_info` table bootstrap

use super::{DbError, SurveyPool};

/// Create the survey table if it does not exist yet.
///
/// Idempotent; run at startup and by `parksurvey migrate`.
pub async fn ensure_schema(pool: &SurveyPool) -> Result<(), DbError> {
    tracing::info!("Ensuring people_info schema...");

    let mut conn = pool.acquire().await?;
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS people_info (
            h3index TEXT PRIMARY KEY,
            hexdistancetopark INTEGER NOT NULL CHECK (hexdistancetopark >= 0),
            married TEXT,
            education TEXT,
            employment TEXT,
            numkids TEXT,
            income BIGINT CHECK (income >= 0)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
