//! Ports for invitation persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_core::AppResult;
use retailhub_domain::{EmailAddress, Invitation, InvitationId, InvitationStatus};

/// Insert payload for a new invitation. Stored at `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvitation {
    /// Canonical recipient address.
    pub email: EmailAddress,
    /// Prospect business name.
    pub business_name: Option<String>,
    /// Prospect contact person.
    pub contact_name: Option<String>,
    /// Prospect phone number.
    pub phone: Option<String>,
    /// Registration redemption secret.
    pub invitation_token: String,
    /// Open-tracking identifier.
    pub tracking_pixel_id: String,
    /// Click-tracking identifier.
    pub click_tracking_id: String,
    /// Creating actor subject.
    pub invited_by: String,
    /// Provenance map.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Repository port for invitations.
///
/// Implementations must enforce at the storage layer that at most one
/// unresolved invitation exists per email, and must apply status changes as
/// single conditional updates.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Lists invitations newest-first, optionally filtered by status.
    async fn list_invitations(
        &self,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<Invitation>>;

    /// Inserts a pending invitation.
    ///
    /// Returns `AppError::Conflict` when an unresolved invitation already
    /// exists for the email.
    async fn create_invitation(&self, invitation: NewInvitation) -> AppResult<Invitation>;

    /// Finds an invitation by its tracking pixel identifier.
    async fn find_by_tracking_pixel_id(
        &self,
        tracking_pixel_id: &str,
    ) -> AppResult<Option<Invitation>>;

    /// Finds an invitation by its click tracking identifier.
    async fn find_by_click_tracking_id(
        &self,
        click_tracking_id: &str,
    ) -> AppResult<Option<Invitation>>;

    /// Moves a pending invitation to `sent`, stamping `email_sent_at` when given.
    ///
    /// Returns `None` when the invitation is no longer pending.
    async fn mark_sent(
        &self,
        invitation_id: InvitationId,
        email_sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Invitation>>;

    /// Sets `target` only if the current status is one of
    /// [`InvitationStatus::escalation_sources`]. Returns whether a row changed.
    async fn advance_status(
        &self,
        invitation_id: InvitationId,
        target: InvitationStatus,
    ) -> AppResult<bool>;

    /// Expires unresolved invitations created before `cutoff`. Returns the count.
    async fn expire_unresolved_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
