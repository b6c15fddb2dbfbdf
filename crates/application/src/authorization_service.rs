use std::sync::Arc;

use async_trait::async_trait;
use retailhub_core::{AppError, AppResult, UserIdentity};
use retailhub_domain::ActorRole;
use tracing::debug;

/// Repository port for role lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Returns the role assigned to exactly this subject, if any.
    async fn find_role(&self, subject: &str) -> AppResult<Option<ActorRole>>;
}

/// Application service for admin capability checks.
///
/// Capability is resolved for the requesting subject only. The existence of
/// other admin accounts never grants access.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Returns whether the actor holds the admin role.
    pub async fn is_admin(&self, actor: &UserIdentity) -> AppResult<bool> {
        if actor.subject().trim().is_empty() {
            return Ok(false);
        }

        let role = self.repository.find_role(actor.subject()).await?;
        Ok(role.is_some_and(|role| role.is_admin()))
    }

    /// Ensures the actor holds the admin role.
    pub async fn require_admin(&self, actor: &UserIdentity) -> AppResult<()> {
        if self.is_admin(actor).await? {
            return Ok(());
        }

        debug!(subject = actor.subject(), "admin capability check failed");
        Err(AppError::Unauthorized(format!(
            "subject '{}' is not allowed to perform admin actions",
            actor.subject()
        )))
    }
}
