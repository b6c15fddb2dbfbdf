//! PostgreSQL-backed retailer accounts and activation tokens.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_application::{
    ActivationRedemption, ActivationTokenRepository, NewActivationToken, RetailerRepository,
};
use retailhub_core::{AppError, AppResult};
use retailhub_domain::{
    ActivationToken, ActivationTokenId, RetailerAccount, RetailerId, RetailerStatus,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;


/// PostgreSQL implementation of the retailer repository port.
#[derive(Clone)]
pub struct PostgresRetailerRepository {
    pool: PgPool,
}

impl PostgresRetailerRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RetailerRepository for PostgresRetailerRepository {
    async fn find_retailer(&self, retailer_id: RetailerId) -> AppResult<Option<RetailerAccount>> {
        let row = sqlx::query_as::<_, RetailerRow>(
            r#"
            SELECT id, business_name, contact_name, email, phone, address, status,
                   created_at, updated_at
            FROM retailers
            WHERE id = $1
            "#,
        )
        .bind(retailer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!("failed to load retailer '{retailer_id}': {error}"))
        })?;

        row.map(RetailerAccount::try_from).transpose()
    }

    async fn transition_status(
        &self,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<Option<RetailerAccount>> {
        let row = sqlx::query_as::<_, RetailerRow>(
            r#"
            UPDATE retailers
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, business_name, contact_name, email, phone, address, status,
                      created_at, updated_at
            "#,
        )
        .bind(retailer_id.as_uuid())
        .bind(target.as_str())
        .bind(status_sources(target))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to set retailer '{retailer_id}' to '{}': {error}",
                target.as_str()
            ))
        })?;

        row.map(RetailerAccount::try_from).transpose()
    }
}

/// PostgreSQL implementation of the activation token repository port.
#[derive(Clone)]
pub struct PostgresActivationTokenRepository {
    pool: PgPool,
}

impl PostgresActivationTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivationTokenRepository for PostgresActivationTokenRepository {
    async fn issue_token(&self, token: NewActivationToken) -> AppResult<ActivationToken> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Dependency(format!(
                "failed to start activation token transaction for retailer '{}': {error}",
                token.retailer_id
            ))
        })?;

        sqlx::query(
            r#"
            UPDATE activation_tokens
            SET superseded_at = $2
            WHERE retailer_id = $1
              AND redeemed_at IS NULL
              AND superseded_at IS NULL
            "#,
        )
        .bind(token.retailer_id.as_uuid())
        .bind(token.issued_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to supersede activation tokens for retailer '{}': {error}",
                token.retailer_id
            ))
        })?;

        let row = sqlx::query_as::<_, ActivationTokenRow>(
            r#"
            INSERT INTO activation_tokens (id, retailer_id, token_hash, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, retailer_id, token_hash, issued_at, expires_at, redeemed_at,
                      superseded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token.retailer_id.as_uuid())
        .bind(token.token_hash.as_str())
        .bind(token.issued_at)
        .bind(token.expires_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to insert activation token for retailer '{}': {error}",
                token.retailer_id
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Dependency(format!(
                "failed to commit activation token for retailer '{}': {error}",
                token.retailer_id
            ))
        })?;

        Ok(ActivationToken::from(row))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<ActivationToken>> {
        let row = sqlx::query_as::<_, ActivationTokenRow>(
            r#"
            SELECT id, retailer_id, token_hash, issued_at, expires_at, redeemed_at, superseded_at
            FROM activation_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Dependency(format!("failed to find activation token: {error}")))?;

        Ok(row.map(ActivationToken::from))
    }

    async fn redeem_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>> {
        let row = sqlx::query_as::<_, ActivationTokenRow>(
            r#"
            UPDATE activation_tokens
            SET redeemed_at = $2
            WHERE token_hash = $1
              AND redeemed_at IS NULL
              AND superseded_at IS NULL
              AND expires_at > $2
            RETURNING id, retailer_id, token_hash, issued_at, expires_at, redeemed_at,
                      superseded_at
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!("failed to redeem activation token: {error}"))
        })?;

        Ok(row.map(ActivationToken::from))
    }

    async fn redeem_and_activate(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ActivationRedemption> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Dependency(format!("failed to start activation transaction: {error}"))
        })?;

        let token = sqlx::query_as::<_, ActivationTokenRow>(
            r#"
            UPDATE activation_tokens
            SET redeemed_at = $2
            WHERE token_hash = $1
              AND redeemed_at IS NULL
              AND superseded_at IS NULL
              AND expires_at > $2
            RETURNING id, retailer_id, token_hash, issued_at, expires_at, redeemed_at,
                      superseded_at
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Dependency(format!("failed to redeem activation token: {error}"))
        })?;

        let Some(token) = token else {
            return Ok(ActivationRedemption::TokenUnavailable);
        };
        let retailer_id = RetailerId::from_uuid(token.retailer_id);

        let activated = sqlx::query_as::<_, RetailerRow>(
            r#"
            UPDATE retailers
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, business_name, contact_name, email, phone, address, status,
                      created_at, updated_at
            "#,
        )
        .bind(retailer_id.as_uuid())
        .bind(RetailerStatus::Active.as_str())
        .bind(status_sources(RetailerStatus::Active))
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to activate retailer '{retailer_id}': {error}"
            ))
        })?;

        let Some(activated) = activated else {
            let status = sqlx::query_scalar::<_, String>(
                r#"
                SELECT status
                FROM retailers
                WHERE id = $1
                "#,
            )
            .bind(retailer_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Dependency(format!(
                    "failed to load retailer '{retailer_id}': {error}"
                ))
            })?
            .map(|status| {
                RetailerStatus::from_str(status.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid status stored for retailer '{retailer_id}': {error}"
                    ))
                })
            })
            .transpose()?;

            transaction.rollback().await.map_err(|error| {
                AppError::Dependency(format!("failed to roll back activation: {error}"))
            })?;

            return Ok(ActivationRedemption::NotAwaitingActivation {
                retailer_id,
                status,
            });
        };

        let account = RetailerAccount::try_from(activated)?;

        transaction.commit().await.map_err(|error| {
            AppError::Dependency(format!(
                "failed to commit activation for retailer '{retailer_id}': {error}"
            ))
        })?;

        Ok(ActivationRedemption::Activated(account))
    }
}

fn status_sources(target: RetailerStatus) -> Vec<String> {
    RetailerStatus::transition_sources(target)
        .iter()
        .map(|status| status.as_str().to_owned())
        .collect()
}

#[derive(Debug, FromRow)]
struct RetailerRow {
    id: Uuid,
    business_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RetailerRow> for RetailerAccount {
    type Error = AppError;

    fn try_from(row: RetailerRow) -> Result<Self, Self::Error> {
        let status = RetailerStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid status stored for retailer '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            id: RetailerId::from_uuid(row.id),
            business_name: row.business_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActivationTokenRow {
    id: Uuid,
    retailer_id: Uuid,
    token_hash: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    redeemed_at: Option<DateTime<Utc>>,
    superseded_at: Option<DateTime<Utc>>,
}

impl From<ActivationTokenRow> for ActivationToken {
    fn from(row: ActivationTokenRow) -> Self {
        Self {
            id: ActivationTokenId::from_uuid(row.id),
            retailer_id: RetailerId::from_uuid(row.retailer_id),
            token_hash: row.token_hash,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            redeemed_at: row.redeemed_at,
            superseded_at: row.superseded_at,
        }
    }
}
