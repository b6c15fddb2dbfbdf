use retailhub_domain::InvitationId;
use tracing::{debug, info};

use super::*;

impl InvitationService {
    /// Records a tracking pixel fetch.
    ///
    /// Unknown identifiers are not an error; the pixel is served regardless.
    pub async fn record_open(&self, tracking_pixel_id: &str) -> AppResult<TrackingOutcome> {
        let tracking_pixel_id = tracking_pixel_id.trim();
        let invitation = if tracking_pixel_id.is_empty() {
            None
        } else {
            self.repository
                .find_by_tracking_pixel_id(tracking_pixel_id)
                .await?
        };

        let Some(invitation) = invitation else {
            debug!("open event for unknown tracking pixel");
            return Ok(TrackingOutcome::Unknown);
        };

        self.escalate(invitation.id, InvitationStatus::Opened).await
    }

    /// Records a tracked link click and resolves the redirect destination.
    pub async fn record_click(&self, click_tracking_id: &str) -> AppResult<ClickResolution> {
        let click_tracking_id = click_tracking_id.trim();
        let invitation = if click_tracking_id.is_empty() {
            None
        } else {
            self.repository
                .find_by_click_tracking_id(click_tracking_id)
                .await?
        };

        let Some(invitation) = invitation else {
            debug!("click event for unknown tracking id");
            return Ok(ClickResolution {
                outcome: TrackingOutcome::Unknown,
                destination: self.links.landing_url(),
            });
        };

        let outcome = self
            .escalate(invitation.id, InvitationStatus::Clicked)
            .await?;

        Ok(ClickResolution {
            outcome,
            destination: self.links.registration_url(&invitation.invitation_token),
        })
    }

    async fn escalate(
        &self,
        invitation_id: InvitationId,
        target: InvitationStatus,
    ) -> AppResult<TrackingOutcome> {
        if self.repository.advance_status(invitation_id, target).await? {
            info!(%invitation_id, status = target.as_str(), "invitation engagement recorded");
            return Ok(TrackingOutcome::Escalated(target));
        }

        Ok(TrackingOutcome::Unchanged)
    }
}
