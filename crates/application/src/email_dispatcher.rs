//! Renders templated messages and submits them to the email provider.
//!
//! Dispatch never fails the caller: every attempt yields a [`DispatchOutcome`]
//! and provider errors or timeouts are folded into it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use retailhub_domain::{EmailAddress, EmailDispatchRecord, EmailTemplateKind};
use serde::Serialize;
use tracing::{info, warn};

use crate::email_ports::{EmailDispatchRepository, EmailProvider, OutboundEmail};

mod templates;


pub use templates::{
    ApprovedEmail, ColdOutreachEmail, EmailTemplate, FALLBACK_BUSINESS_NAME, FALLBACK_CONTACT_NAME,
    FALLBACK_REJECTION_REASON, RejectedEmail, RenderedEmail,
};

/// Upper bound for a single provider call.
pub const MAX_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Template that was (or would have been) sent.
    pub template_kind: EmailTemplateKind,
    /// When the attempt started.
    pub attempted_at: DateTime<Utc>,
    /// Whether the provider accepted the message.
    pub succeeded: bool,
    /// Provider message id.
    pub provider_reference: Option<String>,
    /// Failure detail.
    pub error: Option<String>,
}

impl DispatchOutcome {
    /// Outcome for an email that could not be attempted at all.
    #[must_use]
    pub fn not_attempted(template_kind: EmailTemplateKind, reason: impl Into<String>) -> Self {
        Self {
            template_kind,
            attempted_at: Utc::now(),
            succeeded: false,
            provider_reference: None,
            error: Some(reason.into()),
        }
    }
}

/// Email dispatcher shared by the invitation ledger and the approval workflow.
#[derive(Clone)]
pub struct EmailDispatcher {
    provider: Arc<dyn EmailProvider>,
    dispatch_log: Option<Arc<dyn EmailDispatchRepository>>,
    timeout: Duration,
}

impl EmailDispatcher {
    /// Creates a dispatcher. The timeout is clamped to `1s..=10s`.
    #[must_use]
    pub fn new(provider: Arc<dyn EmailProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            dispatch_log: None,
            timeout: timeout.clamp(Duration::from_secs(1), MAX_DISPATCH_TIMEOUT),
        }
    }

    /// Records every attempt in the given dispatch log.
    #[must_use]
    pub fn with_dispatch_log(mut self, dispatch_log: Arc<dyn EmailDispatchRepository>) -> Self {
        self.dispatch_log = Some(dispatch_log);
        self
    }

    /// Renders `template` and sends it to `recipient`.
    pub async fn send(&self, template: &EmailTemplate, recipient: &EmailAddress) -> DispatchOutcome {
        let template_kind = template.kind();
        let rendered = template.render();
        let message = OutboundEmail {
            to: recipient.as_str().to_owned(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
        };

        let attempted_at = Utc::now();
        let result = tokio::time::timeout(self.timeout, self.provider.send_email(&message)).await;

        let outcome = match result {
            Ok(Ok(receipt)) => {
                info!(
                    recipient = recipient.as_str(),
                    template = template_kind.as_str(),
                    provider_reference = receipt.provider_reference.as_deref(),
                    "email dispatched"
                );
                DispatchOutcome {
                    template_kind,
                    attempted_at,
                    succeeded: true,
                    provider_reference: receipt.provider_reference,
                    error: None,
                }
            }
            Ok(Err(error)) => {
                warn!(
                    recipient = recipient.as_str(),
                    template = template_kind.as_str(),
                    %error,
                    "email dispatch failed"
                );
                DispatchOutcome {
                    template_kind,
                    attempted_at,
                    succeeded: false,
                    provider_reference: None,
                    error: Some(error.to_string()),
                }
            }
            Err(_) => {
                let detail = format!(
                    "email provider did not respond within {}s",
                    self.timeout.as_secs()
                );
                warn!(
                    recipient = recipient.as_str(),
                    template = template_kind.as_str(),
                    "{detail}"
                );
                DispatchOutcome {
                    template_kind,
                    attempted_at,
                    succeeded: false,
                    provider_reference: None,
                    error: Some(detail),
                }
            }
        };

        self.log_attempt(recipient, &outcome).await;
        outcome
    }

    async fn log_attempt(&self, recipient: &EmailAddress, outcome: &DispatchOutcome) {
        let Some(dispatch_log) = &self.dispatch_log else {
            return;
        };

        let record = EmailDispatchRecord {
            recipient: recipient.as_str().to_owned(),
            template_kind: outcome.template_kind,
            attempted_at: outcome.attempted_at,
            succeeded: outcome.succeeded,
            provider_reference: outcome.provider_reference.clone(),
            error: outcome.error.clone(),
        };

        if let Err(error) = dispatch_log.record_dispatch(&record).await {
            warn!(%error, recipient = recipient.as_str(), "failed to record email dispatch");
        }
    }
}
