//! PostgreSQL-backed email dispatch log.

use async_trait::async_trait;
use retailhub_application::EmailDispatchRepository;
use retailhub_core::{AppError, AppResult};
use retailhub_domain::EmailDispatchRecord;
use sqlx::PgPool;

/// Append-only log of email dispatch attempts.
#[derive(Clone)]
pub struct PostgresEmailDispatchRepository {
    pool: PgPool,
}

impl PostgresEmailDispatchRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailDispatchRepository for PostgresEmailDispatchRepository {
    async fn record_dispatch(&self, record: &EmailDispatchRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_dispatches (
                recipient,
                template_kind,
                attempted_at,
                succeeded,
                provider_reference,
                error
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.recipient.as_str())
        .bind(record.template_kind.as_str())
        .bind(record.attempted_at)
        .bind(record.succeeded)
        .bind(record.provider_reference.as_deref())
        .bind(record.error.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Dependency(format!("failed to record email dispatch: {error}")))?;

        Ok(())
    }
}
