//! Retailer approval state machine.
//!
//! Every review follows the same order: admin check, load, notification
//! address check, authoritative status write, then a best-effort email. A
//! failure before the write leaves the retailer untouched; nothing after the
//! write can undo it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use retailhub_core::{AppError, AppResult, UserIdentity};
use retailhub_domain::{EmailAddress, RetailerAccount, RetailerId, RetailerStatus};
use tracing::{error, info};

use crate::activation_service::ActivationService;
use crate::authorization_service::AuthorizationService;
use crate::email_dispatcher::{DispatchOutcome, EmailDispatcher};
use crate::links::PublicLinks;
use crate::retailer_ports::RetailerRepository;

mod approve;
mod reject;

#[cfg(test)]
mod tests;

/// Admin decision on a retailer registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Approve and send an activation link.
    Approve,
    /// Reject with an optional reason quoted in the email.
    Reject {
        /// Admin-supplied reason.
        reason: Option<String>,
    },
}

impl ReviewAction {
    /// Status the action moves the retailer to.
    #[must_use]
    pub fn target_status(&self) -> RetailerStatus {
        match self {
            Self::Approve => RetailerStatus::Approved,
            Self::Reject { .. } => RetailerStatus::Rejected,
        }
    }
}

/// Result of a completed review.
///
/// The status change always took effect; `email` reports the notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    /// Retailer after the status write.
    pub retailer: RetailerAccount,
    /// Notification outcome.
    pub email: DispatchOutcome,
    /// Expiry of the issued activation token, for approvals.
    pub activation_expires_at: Option<DateTime<Utc>>,
}

/// Application service for retailer review decisions.
#[derive(Clone)]
pub struct RetailerApprovalService {
    authorization_service: AuthorizationService,
    retailer_repository: Arc<dyn RetailerRepository>,
    activation_service: ActivationService,
    email_dispatcher: EmailDispatcher,
    links: PublicLinks,
}

impl RetailerApprovalService {
    /// Creates a new approval service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        retailer_repository: Arc<dyn RetailerRepository>,
        activation_service: ActivationService,
        email_dispatcher: EmailDispatcher,
        links: PublicLinks,
    ) -> Self {
        Self {
            authorization_service,
            retailer_repository,
            activation_service,
            email_dispatcher,
            links,
        }
    }

    /// Applies `action` to the retailer.
    pub async fn review(
        &self,
        actor: &UserIdentity,
        retailer_id: RetailerId,
        action: ReviewAction,
    ) -> AppResult<ReviewOutcome> {
        match action {
            ReviewAction::Approve => self.approve(actor, retailer_id).await,
            ReviewAction::Reject { reason } => {
                self.reject(actor, retailer_id, reason.as_deref()).await
            }
        }
    }

    /// Runs every check that must pass before the status write.
    async fn prepare(
        &self,
        actor: &UserIdentity,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<(RetailerAccount, EmailAddress)> {
        self.authorization_service.require_admin(actor).await?;

        let retailer = self
            .retailer_repository
            .find_retailer(retailer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("retailer '{retailer_id}' not found")))?;

        let recipient = retailer.notification_email()?;

        if !retailer.status.can_transition_to(target) {
            return Err(invalid_transition(&retailer, target));
        }

        Ok((retailer, recipient))
    }

    /// Performs the authoritative conditional status write.
    async fn write_status(
        &self,
        actor: &UserIdentity,
        retailer: &RetailerAccount,
        target: RetailerStatus,
    ) -> AppResult<RetailerAccount> {
        let updated = self
            .retailer_repository
            .transition_status(retailer.id, target)
            .await
            .map_err(|error| {
                let error = match error {
                    AppError::Internal(message) => AppError::Dependency(message),
                    other => other,
                };
                error!(retailer_id = %retailer.id, %error, "retailer status write failed");
                error
            })?;

        let Some(updated) = updated else {
            // Another review won the race between the pre-check and the write.
            return Err(AppError::Conflict(format!(
                "retailer '{}' changed status concurrently; reload and retry",
                retailer.id
            )));
        };

        info!(
            retailer_id = %updated.id,
            subject = actor.subject(),
            from = retailer.status.as_str(),
            to = updated.status.as_str(),
            "retailer status changed"
        );

        Ok(updated)
    }
}

fn invalid_transition(retailer: &RetailerAccount, target: RetailerStatus) -> AppError {
    AppError::Conflict(format!(
        "retailer '{}' is '{}' and cannot become '{}'",
        retailer.id,
        retailer.status.as_str(),
        target.as_str()
    ))
}
