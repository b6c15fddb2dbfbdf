use retailhub_core::AppError;
use retailhub_domain::EmailAddress;
use tracing::{info, warn};

use super::*;
use crate::email_dispatcher::{ColdOutreachEmail, EmailTemplate};
use crate::invitation_ports::NewInvitation;

impl InvitationService {
    /// Creates a batch of invitations, one independent entry at a time.
    ///
    /// Entry failures are reported per entry; only a failed admin check or an
    /// unavailable entropy source fail the whole call.
    pub async fn create_invitations(
        &self,
        actor: &UserIdentity,
        requests: Vec<InvitationRequest>,
        send_email: bool,
    ) -> AppResult<InvitationBatchOutcome> {
        self.authorization_service.require_admin(actor).await?;

        let mut outcome = InvitationBatchOutcome::default();
        for request in requests {
            let entry = self.create_one(actor, request, send_email).await?;
            outcome.entries.push(entry);
        }

        let created = outcome.created().count();
        info!(
            subject = actor.subject(),
            created,
            failed = outcome.entries.len() - created,
            "invitation batch processed"
        );

        Ok(outcome)
    }

    async fn create_one(
        &self,
        actor: &UserIdentity,
        request: InvitationRequest,
        send_email: bool,
    ) -> AppResult<Result<CreatedInvitation, InvitationEntryError>> {
        let raw_email = request.email.unwrap_or_default();
        if raw_email.trim().is_empty() {
            return Ok(Err(InvitationEntryError::new("", "email required")));
        }

        let Ok(email) = EmailAddress::new(raw_email.as_str()) else {
            return Ok(Err(InvitationEntryError::new(
                raw_email,
                "invalid email address",
            )));
        };

        let tokens = self.token_service.issue_invitation_set()?;

        let mut metadata = request.metadata;
        metadata
            .entry(CREATED_VIA_KEY)
            .or_insert_with(|| CREATED_VIA_ADMIN_BATCH.into());

        let new_invitation = NewInvitation {
            email: email.clone(),
            business_name: non_blank(request.business_name),
            contact_name: non_blank(request.contact_name),
            phone: non_blank(request.phone),
            invitation_token: tokens.invitation_token,
            tracking_pixel_id: tokens.tracking_pixel_id,
            click_tracking_id: tokens.click_tracking_id,
            invited_by: actor.subject().to_owned(),
            metadata,
        };

        let invitation = match self.repository.create_invitation(new_invitation).await {
            Ok(invitation) => invitation,
            Err(AppError::Conflict(_)) => {
                return Ok(Err(InvitationEntryError::new(
                    email.as_str(),
                    "duplicate pending invitation",
                )));
            }
            Err(error) => {
                warn!(email = email.as_str(), %error, "failed to store invitation");
                return Ok(Err(InvitationEntryError::new(
                    email.as_str(),
                    format!("failed to store invitation: {error}"),
                )));
            }
        };

        if !send_email {
            return Ok(Ok(CreatedInvitation {
                invitation,
                email: None,
            }));
        }

        let template = EmailTemplate::ColdOutreach(ColdOutreachEmail {
            business_name: invitation.business_name.clone(),
            contact_name: invitation.contact_name.clone(),
            click_url: self.links.click_url(&invitation.click_tracking_id),
            pixel_url: self.links.pixel_url(&invitation.tracking_pixel_id),
        });
        let dispatch = self.email_dispatcher.send(&template, &invitation.email).await;

        let email_sent_at = dispatch.succeeded.then_some(dispatch.attempted_at);
        let invitation = match self.repository.mark_sent(invitation.id, email_sent_at).await {
            Ok(Some(updated)) => updated,
            Ok(None) => invitation,
            Err(error) => {
                warn!(
                    invitation_id = %invitation.id,
                    %error,
                    "failed to record invitation dispatch"
                );
                invitation
            }
        };

        Ok(Ok(CreatedInvitation {
            invitation,
            email: Some(dispatch),
        }))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
