use super::*;
use crate::email_dispatcher::{EmailTemplate, RejectedEmail};

impl RetailerApprovalService {
    /// Rejects a retailer and emails the reason.
    ///
    /// The status is written before the email is attempted. A blank reason is
    /// replaced by the generic fallback text in the email.
    pub async fn reject(
        &self,
        actor: &UserIdentity,
        retailer_id: RetailerId,
        reason: Option<&str>,
    ) -> AppResult<ReviewOutcome> {
        let (retailer, recipient) = self
            .prepare(actor, retailer_id, RetailerStatus::Rejected)
            .await?;
        let retailer = self
            .write_status(actor, &retailer, RetailerStatus::Rejected)
            .await?;

        let reason = reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_owned);
        let template = EmailTemplate::Rejected(RejectedEmail {
            business_name: Some(retailer.business_name.clone()),
            contact_name: Some(retailer.contact_name.clone()),
            reason,
        });
        let email = self.email_dispatcher.send(&template, &recipient).await;

        Ok(ReviewOutcome {
            retailer,
            email,
            activation_expires_at: None,
        })
    }
}
