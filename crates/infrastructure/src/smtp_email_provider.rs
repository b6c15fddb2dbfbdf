//! SMTP email provider using the `lettre` crate.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use retailhub_application::{EmailProvider, OutboundEmail, ProviderReceipt};
use retailhub_core::{AppError, AppResult};
use uuid::Uuid;

/// SMTP email provider configuration.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender email address.
    pub from_address: String,
    /// Connection and command timeout.
    pub timeout: Duration,
}

/// Production email provider using SMTP.
#[derive(Clone)]
pub struct SmtpEmailProvider {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailProvider {
    /// Creates a new SMTP email provider.
    pub fn new(config: SmtpEmailConfig) -> AppResult<Self> {
        let from = config
            .from_address
            .parse()
            .map_err(|error| AppError::Validation(format!("invalid from address: {error}")))?;

        let credentials = Credentials::new(config.username, config.password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { from, mailer })
    }
}

fn build_message(from: &Mailbox, email: &OutboundEmail, message_id: &str) -> AppResult<Message> {
    let to_mailbox: Mailbox = email
        .to
        .parse()
        .map_err(|error| AppError::Validation(format!("invalid recipient address: {error}")))?;

    Message::builder()
        .from(from.clone())
        .to(to_mailbox)
        .subject(email.subject.as_str())
        .message_id(Some(message_id.to_owned()))
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|error| AppError::Internal(format!("failed to build email: {error}")))
}

#[async_trait]
impl EmailProvider for SmtpEmailProvider {
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt> {
        let message_id = format!("<{}@retailhub>", Uuid::new_v4());
        let message = build_message(&self.from, email, message_id.as_str())?;

        self.mailer
            .send(message)
            .await
            .map_err(|error| AppError::Dependency(format!("failed to send email: {error}")))?;

        Ok(ProviderReceipt {
            provider_reference: Some(message_id),
        })
    }
}
