//! Invitation ledger and engagement tracking.

use std::sync::Arc;

use retailhub_core::{AppResult, UserIdentity};
use retailhub_domain::{Invitation, InvitationStatus};
use serde::Serialize;

use crate::authorization_service::AuthorizationService;
use crate::email_dispatcher::{DispatchOutcome, EmailDispatcher};
use crate::invitation_ports::InvitationRepository;
use crate::links::PublicLinks;
use crate::token_service::TokenService;

mod create;
mod expiry;
mod tracking;

#[cfg(test)]
mod tests;

/// Metadata key recording how an invitation entered the ledger.
pub const CREATED_VIA_KEY: &str = "created_via";
/// Default `created_via` value for invitations created by staff.
pub const CREATED_VIA_ADMIN_BATCH: &str = "admin_batch";

/// One requested invitation in a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvitationRequest {
    /// Recipient address as typed by the admin.
    pub email: Option<String>,
    /// Prospect business name.
    pub business_name: Option<String>,
    /// Prospect contact person.
    pub contact_name: Option<String>,
    /// Prospect phone number.
    pub phone: Option<String>,
    /// Provenance supplied by the caller.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Per-entry batch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationEntryError {
    /// Email as supplied, or empty when missing.
    pub email: String,
    /// Human readable reason.
    pub reason: String,
}

impl InvitationEntryError {
    fn new(email: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            reason: reason.into(),
        }
    }
}

/// Invitation created by a batch together with its email warning, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedInvitation {
    /// Persisted invitation.
    pub invitation: Invitation,
    /// Dispatch outcome when an email was requested.
    pub email: Option<DispatchOutcome>,
}

impl CreatedInvitation {
    /// Returns whether an email was requested but not accepted.
    #[must_use]
    pub fn has_email_warning(&self) -> bool {
        self.email.as_ref().is_some_and(|outcome| !outcome.succeeded)
    }
}

/// Per-entry results of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvitationBatchOutcome {
    /// One result per request.
    pub entries: Vec<Result<CreatedInvitation, InvitationEntryError>>,
}

impl InvitationBatchOutcome {
    /// Created invitations in input order.
    pub fn created(&self) -> impl Iterator<Item = &CreatedInvitation> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    /// Entry errors in input order.
    pub fn errors(&self) -> impl Iterator<Item = &InvitationEntryError> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    /// Splits the outcome into created invitations and entry errors.
    #[must_use]
    pub fn into_parts(self) -> (Vec<CreatedInvitation>, Vec<InvitationEntryError>) {
        let mut created = Vec::new();
        let mut errors = Vec::new();
        for entry in self.entries {
            match entry {
                Ok(invitation) => created.push(invitation),
                Err(error) => errors.push(error),
            }
        }
        (created, errors)
    }
}

/// Result of a tracking hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingOutcome {
    /// The invitation moved up the engagement ladder.
    Escalated(InvitationStatus),
    /// The invitation was already at or beyond the event's status.
    Unchanged,
    /// No invitation carries the identifier.
    Unknown,
}

/// Click hit result with the redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickResolution {
    /// What happened to the invitation.
    pub outcome: TrackingOutcome,
    /// Where the recipient is sent next.
    pub destination: String,
}

/// Application service owning the invitation ledger.
#[derive(Clone)]
pub struct InvitationService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn InvitationRepository>,
    token_service: TokenService,
    email_dispatcher: EmailDispatcher,
    links: PublicLinks,
}

impl InvitationService {
    /// Creates a new invitation service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn InvitationRepository>,
        token_service: TokenService,
        email_dispatcher: EmailDispatcher,
        links: PublicLinks,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            token_service,
            email_dispatcher,
            links,
        }
    }

    /// Lists invitations newest-first, optionally filtered by status.
    pub async fn list_invitations(
        &self,
        actor: &UserIdentity,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<Invitation>> {
        self.authorization_service.require_admin(actor).await?;
        self.repository.list_invitations(status).await
    }
}
