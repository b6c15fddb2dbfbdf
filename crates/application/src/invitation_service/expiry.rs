use chrono::{Duration, Utc};
use retailhub_core::AppError;
use tracing::info;

use super::*;

impl InvitationService {
    /// Expires unresolved invitations older than `older_than`.
    pub async fn expire_stale_invitations(&self, older_than: Duration) -> AppResult<u64> {
        if older_than <= Duration::zero() {
            return Err(AppError::Validation(
                "invitation expiry age must be positive".to_owned(),
            ));
        }

        let cutoff = Utc::now() - older_than;
        let expired = self.repository.expire_unresolved_before(cutoff).await?;
        info!(expired, %cutoff, "stale invitations expired");

        Ok(expired)
    }
}
