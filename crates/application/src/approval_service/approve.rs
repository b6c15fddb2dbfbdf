use retailhub_domain::EmailTemplateKind;
use tracing::warn;

use super::*;
use crate::email_dispatcher::{ApprovedEmail, EmailTemplate};

impl RetailerApprovalService {
    /// Approves a retailer, issues an activation token and emails the link.
    ///
    /// Approving an already approved retailer supersedes the previous token
    /// and sends a fresh link.
    pub async fn approve(
        &self,
        actor: &UserIdentity,
        retailer_id: RetailerId,
    ) -> AppResult<ReviewOutcome> {
        let (retailer, recipient) = self
            .prepare(actor, retailer_id, RetailerStatus::Approved)
            .await?;
        let retailer = self
            .write_status(actor, &retailer, RetailerStatus::Approved)
            .await?;

        let issued = match self.activation_service.issue(retailer.id).await {
            Ok(issued) => issued,
            Err(error) => {
                warn!(
                    retailer_id = %retailer.id,
                    %error,
                    "activation token could not be issued after approval"
                );
                return Ok(ReviewOutcome {
                    retailer,
                    email: DispatchOutcome::not_attempted(
                        EmailTemplateKind::Approved,
                        format!("activation token could not be issued: {error}"),
                    ),
                    activation_expires_at: None,
                });
            }
        };

        let template = EmailTemplate::Approved(ApprovedEmail {
            business_name: Some(retailer.business_name.clone()),
            contact_name: Some(retailer.contact_name.clone()),
            activation_url: self.links.activation_url(&issued.raw_token),
            expires_at: issued.record.expires_at,
        });
        let email = self.email_dispatcher.send(&template, &recipient).await;

        Ok(ReviewOutcome {
            retailer,
            email,
            activation_expires_at: Some(issued.record.expires_at),
        })
    }
}
