//! Survey response repository
//!
//! - upsert: one `INSERT ... ON CONFLICT (h3index) DO UPDATE` per call, full
//!   replace of every non-key column (last committed write wins)
//! - export_csv: every row read in one REPEATABLE READ transaction

use parksurvey_core::csv::{self, CsvRecord};
use parksurvey_core::{CellId, SurveyError, SurveyResponse};
use sqlx::FromRow;

use crate::db::{DbError, SurveyPool};

/// The conflicting row is locked by PostgreSQL for the duration of the
/// statement, so concurrent writers to one cell serialize on it.
const UPSERT_SQL: &str = r#"
    INSERT INTO people_info (h3index, hexdistancetopark, married, education, employment, numkids, income)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (h3index) DO UPDATE
    SET hexdistancetopark = EXCLUDED.hexdistancetopark,
        married = EXCLUDED.married,
        education = EXCLUDED.education,
        employment = EXCLUDED.employment,
        numkids = EXCLUDED.numkids,
        income = EXCLUDED.income
"#;

const SELECT_COLUMNS: &str =
    "SELECT h3index, hexdistancetopark, married, education, employment, numkids, income FROM people_info";

/// Survey row as stored in `people_info`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredResponse {
    pub h3index: String,
    pub hexdistancetopark: i32,
    pub married: Option<String>,
    pub education: Option<String>,
    pub employment: Option<String>,
    pub numkids: Option<String>,
    pub income: Option<i64>,
}

impl TryFrom<&SurveyResponse> for StoredResponse {
    type Error = SurveyError;

    fn try_from(r: &SurveyResponse) -> Result<Self, Self::Error> {
        let hexdistancetopark = i32::try_from(r.hex_distance_to_park).map_err(|_| {
            SurveyError::validation("hexDistanceToPark", "exceeds the INTEGER column range")
        })?;

        Ok(Self {
            h3index: r.h3index.to_string(),
            hexdistancetopark,
            married: r.married.map(|v| v.as_str().to_owned()),
            education: r.education.map(|v| v.as_str().to_owned()),
            employment: r.employment.map(|v| v.as_str().to_owned()),
            numkids: r.num_kids.map(|v| v.as_str().to_owned()),
            income: r.income,
        })
    }
}

impl CsvRecord for StoredResponse {
    fn fields(&self) -> Vec<Option<String>> {
        vec![
            Some(self.h3index.clone()),
            Some(self.hexdistancetopark.to_string()),
            self.married.clone(),
            self.education.clone(),
            self.employment.clone(),
            self.numkids.clone(),
            self.income.map(|v| v.to_string()),
        ]
    }
}

/// Survey response repository
pub struct ResponseRepo<'a> {
    pool: &'a SurveyPool,
}

impl<'a> ResponseRepo<'a> {
    pub fn new(pool: &'a SurveyPool) -> Self {
        Self { pool }
    }

    /// Insert the row for `response.h3index`, or replace every other column
    /// of the existing row.
    ///
    /// A key conflict is the normal update path. On failure the transaction
    /// is rolled back and no column of the prior row changes.
    pub async fn upsert(&self, response: &SurveyResponse) -> Result<(), DbError> {
        let row = StoredResponse::try_from(response)?;
        self.write(&row).await?;
        tracing::debug!(h3index = %row.h3index, "survey response upserted");
        Ok(())
    }

    /// Run the upsert statement for an already-converted row.
    pub(crate) async fn write(&self, row: &StoredResponse) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(UPSERT_SQL)
            .bind(&row.h3index)
            .bind(row.hexdistancetopark)
            .bind(&row.married)
            .bind(&row.education)
            .bind(&row.employment)
            .bind(&row.numkids)
            .bind(row.income)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    // Dropping the connection discards the transaction anyway
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(DbError::Storage(err))
            }
        }
    }

    /// Fetch the row for one cell.
    pub async fn get(&self, cell: &CellId) -> Result<Option<StoredResponse>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, StoredResponse>(&format!("{SELECT_COLUMNS} WHERE h3index = $1"))
            .bind(cell.to_string())
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Number of stored responses.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.acquire().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM people_info")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Every stored row, ordered by cell id, from one snapshot.
    pub async fn list_all(&self) -> Result<Vec<StoredResponse>, DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, StoredResponse>(&format!("{SELECT_COLUMNS} ORDER BY h3index"))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rows)
    }

    /// Render the whole table as CSV: header plus one line per row.
    ///
    /// Returns the complete document or an error, never a partial one. The
    /// whole export is held in memory.
    pub async fn export_csv(&self) -> Result<String, DbError> {
        let rows = self.list_all().await?;
        let out = csv::render(&rows);
        tracing::info!(rows = rows.len(), bytes = out.len(), "survey responses exported");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use h3o::CellIndex;
    use parksurvey_core::{Education, Employment, MaritalStatus, NumKids, SurveyPayload};
    use serde_json::json;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use sqlx::PgPool;
    use std::time::Duration;

    // Integration tests - each gets a fresh database from sqlx::test
    // Run with: DATABASE_URL=... cargo test -p parksurvey-server -- --ignored

    const CELL: &str = "8928308280fffff";

    async fn setup(pool: PgPool) -> SurveyPool {
        let pool = SurveyPool::from_pg(pool, Duration::from_secs(5));
        ensure_schema(&pool).await.expect("schema bootstrap failed");
        pool
    }

    fn payload(value: serde_json::Value) -> SurveyResponse {
        serde_json::from_value::<SurveyPayload>(value)
            .unwrap()
            .validate()
            .unwrap()
    }

    fn first_submission() -> SurveyResponse {
        payload(json!({
            "h3Index": CELL,
            "hexDistanceToPark": 3,
            "married": "Yes",
            "education": "PhD",
            "employment": "Employed",
            "numKids": "0",
            "income": 50000
        }))
    }

    fn neighbours(n: usize) -> Vec<CellId> {
        let center: CellIndex = CELL.parse().unwrap();
        let disk: Vec<CellIndex> = center.grid_disk(2);
        disk.into_iter().take(n).map(CellId::from).collect()
    }

    #[test]
    fn stored_row_uses_answer_labels() {
        let row = StoredResponse::try_from(&first_submission()).unwrap();
        assert_eq!(row.h3index, CELL);
        assert_eq!(row.hexdistancetopark, 3);
        assert_eq!(row.married.as_deref(), Some("Yes"));
        assert_eq!(row.education.as_deref(), Some("PhD"));
        assert_eq!(row.numkids.as_deref(), Some("0"));
    }

    #[test]
    fn distance_outside_integer_range_is_rejected() {
        let mut response = first_submission();
        response.hex_distance_to_park = u32::MAX;
        assert!(StoredResponse::try_from(&response).is_err());
    }

    #[test]
    fn csv_fields_follow_column_order() {
        let row = StoredResponse {
            h3index: CELL.into(),
            hexdistancetopark: 7,
            married: None,
            education: Some("Master's Degree".into()),
            employment: None,
            numkids: Some("5 or more".into()),
            income: None,
        };
        let out = csv::render(&[row]);
        assert_eq!(
            out.lines().nth(1),
            Some("8928308280fffff,7,,Master's Degree,,5 or more,")
        );
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn resubmission_replaces_the_row(pool: PgPool) -> Result<(), DbError> {
        let pool = setup(pool).await;
        let repo = ResponseRepo::new(&pool);

        repo.upsert(&first_submission()).await?;
        repo.upsert(&payload(json!({
            "h3Index": CELL,
            "hexDistanceToPark": 3,
            "married": "No",
            "education": "PhD",
            "employment": "Employed",
            "numKids": "0",
            "income": 60000
        })))
        .await?;

        assert_eq!(repo.count().await?, 1);
        let row = repo.get(&CELL.parse().unwrap()).await?.expect("row missing");
        assert_eq!(row.income, Some(60000));
        assert_eq!(row.married.as_deref(), Some("No"));
        assert_eq!(row.education.as_deref(), Some("PhD"));
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn replace_does_not_merge_missing_fields(pool: PgPool) -> Result<(), DbError> {
        let pool = setup(pool).await;
        let repo = ResponseRepo::new(&pool);

        repo.upsert(&first_submission()).await?;
        repo.upsert(&payload(json!({
            "h3Index": CELL,
            "hexDistanceToPark": 3,
            "employment": "Retired"
        })))
        .await?;

        let row = repo.get(&CELL.parse().unwrap()).await?.expect("row missing");
        assert_eq!(row.employment.as_deref(), Some("Retired"));
        assert_eq!(row.married, None);
        assert_eq!(row.education, None);
        assert_eq!(row.income, None);
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn export_has_header_plus_one_line_per_cell(pool: PgPool) -> Result<(), DbError> {
        let pool = setup(pool).await;
        let repo = ResponseRepo::new(&pool);
        let cells = neighbours(5);

        for (i, cell) in cells.iter().enumerate() {
            let response = SurveyResponse {
                h3index: *cell,
                hex_distance_to_park: i as u32,
                married: Some(MaritalStatus::No),
                education: Some(Education::HighSchool),
                employment: Some(Employment::Student),
                num_kids: Some(NumKids::Two),
                income: Some(1_000 * i as i64),
            };
            repo.upsert(&response).await?;
        }
        // Overwrite the first cell; the export must show the last write only
        repo.upsert(&SurveyResponse {
            h3index: cells[0],
            hex_distance_to_park: 0,
            married: Some(MaritalStatus::Yes),
            education: None,
            employment: None,
            num_kids: None,
            income: Some(99),
        })
        .await?;

        let out = repo.export_csv().await?;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), cells.len() + 1);
        assert_eq!(
            lines[0],
            "h3index,hexdistancetopark,married,education,employment,numkids,income"
        );

        let first = cells[0].to_string();
        let first_line = lines
            .iter()
            .find(|l| l.starts_with(&first))
            .expect("overwritten cell missing from export");
        assert_eq!(*first_line, format!("{first},0,Yes,,,,99"));

        for (i, cell) in cells.iter().enumerate().skip(1) {
            let expected = format!("{cell},{i},No,High School,Student,2,{}", 1_000 * i);
            assert!(lines.contains(&expected.as_str()), "missing {expected}");
        }
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn failed_write_rolls_back_and_releases_connection(
        pool_opts: PgPoolOptions,
        connect_opts: PgConnectOptions,
    ) -> Result<(), DbError> {
        // A single connection: a leaked checkout would make the next call time out
        let pg = pool_opts
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(2))
            .connect_with(connect_opts)
            .await?;
        let pool = setup(pg).await;
        let repo = ResponseRepo::new(&pool);

        repo.upsert(&first_submission()).await?;
        let before = repo.get(&CELL.parse().unwrap()).await?;

        // Violates CHECK (income >= 0)
        let mut bad = StoredResponse::try_from(&first_submission()).unwrap();
        bad.married = Some("No".into());
        bad.income = Some(-1);
        let err = repo.write(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::Storage(_)));

        let after = repo.get(&CELL.parse().unwrap()).await?;
        assert_eq!(before, after);
        assert_eq!(repo.count().await?, 1);
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn concurrent_writers_to_one_cell_leave_one_row(pool: PgPool) -> Result<(), DbError> {
        let pool = setup(pool).await;

        let handles: Vec<_> = (0..10i64)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let mut response = first_submission();
                    response.income = Some(i);
                    ResponseRepo::new(&pool).upsert(&response).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("task panicked")?;
        }

        let repo = ResponseRepo::new(&pool);
        assert_eq!(repo.count().await?, 1);
        let row = repo.get(&CELL.parse().unwrap()).await?.expect("row missing");
        assert!(matches!(row.income, Some(0..=9)));
        Ok(())
    }
}
