//! Console email provider for development. Logs emails to tracing output.

use async_trait::async_trait;
use retailhub_application::{EmailProvider, OutboundEmail, ProviderReceipt};
use retailhub_core::AppResult;
use tracing::info;
use uuid::Uuid;

/// Development email provider that logs emails to the console.
#[derive(Clone)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Creates a new console email provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for ConsoleEmailProvider {
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt> {
        let provider_reference = format!("console-{}", Uuid::new_v4());

        info!(
            to = email.to.as_str(),
            subject = email.subject.as_str(),
            provider_reference = provider_reference.as_str(),
            "--- EMAIL (console) ---\nTo: {}\nSubject: {}\n\n{}\n--- END EMAIL ---",
            email.to,
            email.subject,
            email.text_body
        );

        Ok(ProviderReceipt {
            provider_reference: Some(provider_reference),
        })
    }
}
