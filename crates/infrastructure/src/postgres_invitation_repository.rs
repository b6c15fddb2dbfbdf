//! PostgreSQL-backed invitation ledger.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_application::{InvitationRepository, NewInvitation};
use retailhub_core::{AppError, AppResult};
use retailhub_domain::{EmailAddress, Invitation, InvitationId, InvitationStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;


const INVITATION_COLUMNS: &str = "id, email, business_name, contact_name, phone, status, \
    invitation_token, tracking_pixel_id, click_tracking_id, invited_by, email_sent_at, \
    metadata, created_at, updated_at";

/// PostgreSQL implementation of the invitation repository port.
#[derive(Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!("failed to find invitation by {column}: {error}"))
        })?;

        row.map(Invitation::try_from).transpose()
    }
}

fn status_values(statuses: &[InvitationStatus]) -> Vec<String> {
    statuses
        .iter()
        .map(|status| status.as_str().to_owned())
        .collect()
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn list_invitations(
        &self,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Dependency(format!("failed to list invitations: {error}")))?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    async fn create_invitation(&self, invitation: NewInvitation) -> AppResult<Invitation> {
        let result = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            INSERT INTO invitations (
                id,
                email,
                business_name,
                contact_name,
                phone,
                status,
                invitation_token,
                tracking_pixel_id,
                click_tracking_id,
                invited_by,
                metadata
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9, $10)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(invitation.email.as_str())
        .bind(invitation.business_name.as_deref())
        .bind(invitation.contact_name.as_deref())
        .bind(invitation.phone.as_deref())
        .bind(invitation.invitation_token.as_str())
        .bind(invitation.tracking_pixel_id.as_str())
        .bind(invitation.click_tracking_id.as_str())
        .bind(invitation.invited_by.as_str())
        .bind(serde_json::Value::Object(invitation.metadata.clone()))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Invitation::try_from(row),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "an open invitation already exists for '{}'",
                        invitation.email
                    )));
                }

                Err(AppError::Dependency(format!(
                    "failed to insert invitation: {error}"
                )))
            }
        }
    }

    async fn find_by_tracking_pixel_id(
        &self,
        tracking_pixel_id: &str,
    ) -> AppResult<Option<Invitation>> {
        self.find_by_column("tracking_pixel_id", tracking_pixel_id)
            .await
    }

    async fn find_by_click_tracking_id(
        &self,
        click_tracking_id: &str,
    ) -> AppResult<Option<Invitation>> {
        self.find_by_column("click_tracking_id", click_tracking_id)
            .await
    }

    async fn mark_sent(
        &self,
        invitation_id: InvitationId,
        email_sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            UPDATE invitations
            SET status = 'sent', email_sent_at = $2, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation_id.as_uuid())
        .bind(email_sent_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to mark invitation '{invitation_id}' as sent: {error}"
            ))
        })?;

        row.map(Invitation::try_from).transpose()
    }

    async fn advance_status(
        &self,
        invitation_id: InvitationId,
        target: InvitationStatus,
    ) -> AppResult<bool> {
        let sources = status_values(InvitationStatus::escalation_sources(target));
        if sources.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = ANY($3)
            "#,
        )
        .bind(invitation_id.as_uuid())
        .bind(target.as_str())
        .bind(sources)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Dependency(format!(
                "failed to advance invitation '{invitation_id}' to '{}': {error}",
                target.as_str()
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn expire_unresolved_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'expired', updated_at = now()
            WHERE status = ANY($1) AND created_at < $2
            "#,
        )
        .bind(status_values(&InvitationStatus::UNRESOLVED))
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Dependency(format!("failed to expire invitations: {error}")))?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, FromRow)]
struct InvitationRow {
    id: Uuid,
    email: String,
    business_name: Option<String>,
    contact_name: Option<String>,
    phone: Option<String>,
    status: String,
    invitation_token: String,
    tracking_pixel_id: String,
    click_tracking_id: String,
    invited_by: String,
    email_sent_at: Option<DateTime<Utc>>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = AppError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let status = InvitationStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid status stored for invitation '{}': {error}",
                row.id
            ))
        })?;
        let email = EmailAddress::new(row.email.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid email stored for invitation '{}': {error}",
                row.id
            ))
        })?;
        let metadata = match row.metadata {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Self {
            id: InvitationId::from_uuid(row.id),
            email,
            business_name: row.business_name,
            contact_name: row.contact_name,
            phone: row.phone,
            status,
            invitation_token: row.invitation_token,
            tracking_pixel_id: row.tracking_pixel_id,
            click_tracking_id: row.click_tracking_id,
            invited_by: row.invited_by,
            email_sent_at: row.email_sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            metadata,
        })
    }
}
