use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::OtpRecord;
use super::OtpStore;
use super::SubscriberStore;
use crate::configuration::DatabaseSettings;
use crate::domain::OtpCode;
use crate::domain::SubscriberEmail;

/// Postgres-backed stores (`otp_codes` and `subscribers` tables, see
/// `migrations/`). Shared by every API replica, unlike `InMemoryStore`.
// queries are built with `sqlx::query` rather than `query!`, so the crate
// builds without a live database or `.sqlx` offline data
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    code: String,
    expires_at: DateTime<Utc>,
}

pub fn get_connection_pool(db_cfg: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(db_cfg.connection())
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Lazily connect and apply pending migrations
    pub async fn connect(db_cfg: &DatabaseSettings) -> Result<Self, anyhow::Error> {
        let pool = get_connection_pool(db_cfg);
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Failed to migrate the database")?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl OtpStore for PgStore {
    #[tracing::instrument(name = "SELECTing otp record", skip_all)]
    async fn get(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<OtpRecord>, anyhow::Error> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
        SELECT code, expires_at
        FROM otp_codes
        WHERE email = $1
        "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch otp record")?;

        let record = match row {
            None => None,
            Some(row) => Some(OtpRecord {
                // codes are validated before they are written
                code: OtpCode::parse(row.code).map_err(|e| anyhow::anyhow!(e))?,
                expires_at: row.expires_at,
            }),
        };
        Ok(record)
    }

    #[tracing::instrument(name = "UPSERTing otp record", skip_all)]
    async fn put(
        &self,
        email: &SubscriberEmail,
        record: &OtpRecord,
    ) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
        INSERT INTO otp_codes (email, code, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (email)
        DO UPDATE SET
            code = EXCLUDED.code,
            expires_at = EXCLUDED.expires_at
        "#,
        )
        .bind(email.as_ref())
        .bind(record.code.as_ref())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to store otp record")?;
        Ok(())
    }

    #[tracing::instrument(name = "DELETEing otp record", skip_all)]
    async fn delete(
        &self,
        email: &SubscriberEmail,
        expected: &OtpRecord,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            r#"
        DELETE FROM otp_codes
        WHERE
            email = $1 AND
            code = $2
        "#,
        )
        .bind(email.as_ref())
        .bind(expected.code.as_ref())
        .execute(&self.pool)
        .await
        .context("Failed to delete otp record")?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "DELETEing expired otp records", skip(self))]
    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, anyhow::Error> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to delete expired otp records")?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SubscriberStore for PgStore {
    async fn contains(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        let found: Option<(String,)> =
            sqlx::query_as("SELECT email FROM subscribers WHERE email = $1")
                .bind(email.as_ref())
                .fetch_optional(&self.pool)
                .await
                .context("Failed to look up subscriber")?;
        Ok(found.is_some())
    }

    #[tracing::instrument(name = "INSERTing new subscriber into db", skip_all)]
    async fn add(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            r#"
        INSERT INTO subscribers (email, subscribed_at)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
        )
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert subscriber")?;
        // nothing inserted -> already subscribed
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "DELETEing subscriber from db", skip_all)]
    async fn remove(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM subscribers WHERE email = $1")
            .bind(email.as_ref())
            .execute(&self.pool)
            .await
            .context("Failed to delete subscriber")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, anyhow::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count subscribers")?;
        Ok(count as u64)
    }
}
