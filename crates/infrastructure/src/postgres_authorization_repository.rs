use std::str::FromStr;

use async_trait::async_trait;

use retailhub_application::AuthorizationRepository;
use retailhub_core::{AppError, AppResult};
use retailhub_domain::ActorRole;

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for subject role lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_role(&self, subject: &str) -> AppResult<Option<ActorRole>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role
            FROM user_roles
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Dependency(format!("failed to load role: {error}")))?;

        row.map(|row| {
            ActorRole::from_str(row.role.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode role '{}' for subject '{subject}': {error}",
                    row.role
                ))
            })
        })
        .transpose()
    }
}
