//! Ports for outbound email and the dispatch log.

use async_trait::async_trait;
use retailhub_core::AppResult;
use retailhub_domain::EmailDispatchRecord;

/// Fully rendered message handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Plain-text body.
    pub text_body: String,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReceipt {
    /// Provider message id, if the provider returns one.
    pub provider_reference: Option<String>,
}

/// Port for sending emails. Infrastructure provides console, SMTP and HTTP implementations.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Submits one message to the provider.
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt>;
}

/// Repository port for the email dispatch log.
#[async_trait]
pub trait EmailDispatchRepository: Send + Sync {
    /// Appends one dispatch attempt.
    async fn record_dispatch(&self, record: &EmailDispatchRecord) -> AppResult<()>;
}
