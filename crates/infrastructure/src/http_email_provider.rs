//! Email provider for transactional email HTTP APIs.
//!
//! Posts a JSON message with a bearer key and reads the message id from the
//! JSON response (`{"id": "..."}`).

use async_trait::async_trait;
use retailhub_application::{EmailProvider, OutboundEmail, ProviderReceipt};
use retailhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// HTTP email provider configuration.
#[derive(Clone)]
pub struct HttpEmailConfig {
    /// Send endpoint.
    pub api_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Sender email address.
    pub from_address: String,
}

/// Email provider backed by an HTTP API.
pub struct HttpEmailProvider {
    http_client: reqwest::Client,
    config: HttpEmailConfig,
}

impl HttpEmailProvider {
    /// Creates a new HTTP email provider.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: HttpEmailConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

fn payload<'a>(from: &'a str, email: &'a OutboundEmail) -> SendEmailPayload<'a> {
    SendEmailPayload {
        from,
        to: [email.to.as_str()],
        subject: email.subject.as_str(),
        html: email.html_body.as_str(),
        text: email.text_body.as_str(),
    }
}

fn provider_reference(body: &str) -> Option<String> {
    serde_json::from_str::<SendEmailResponse>(body)
        .ok()
        .and_then(|response| response.id)
        .filter(|id| !id.trim().is_empty())
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt> {
        let response = self
            .http_client
            .post(self.config.api_url.as_str())
            .bearer_auth(self.config.api_key.as_str())
            .json(&payload(self.config.from_address.as_str(), email))
            .send()
            .await
            .map_err(|error| AppError::Dependency(format!("email API transport error: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());

        if !status.is_success() {
            return Err(AppError::Dependency(format!(
                "email API rejected message with status {status}: {body}"
            )));
        }

        Ok(ProviderReceipt {
            provider_reference: provider_reference(body.as_str()),
        })
    }
}
