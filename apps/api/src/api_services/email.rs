use std::sync::Arc;

use retailhub_application::EmailProvider;
use retailhub_core::AppError;
use retailhub_infrastructure::{
    ConsoleEmailProvider, HttpEmailConfig, HttpEmailProvider, SmtpEmailConfig, SmtpEmailProvider,
};
use tracing::info;

use crate::api_config::{ApiConfig, EmailProviderConfig};

pub(super) fn build_email_provider(
    config: &ApiConfig,
) -> Result<Arc<dyn EmailProvider>, AppError> {
    let provider: Arc<dyn EmailProvider> = match &config.email_provider {
        EmailProviderConfig::Console => {
            info!("email provider: console");
            Arc::new(ConsoleEmailProvider::new())
        }
        EmailProviderConfig::Smtp { smtp, from_address } => {
            info!(host = smtp.host.as_str(), port = smtp.port, "email provider: smtp");
            Arc::new(SmtpEmailProvider::new(SmtpEmailConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                from_address: from_address.clone(),
                timeout: config.email_timeout,
            })?)
        }
        EmailProviderConfig::Http { http, from_address } => {
            info!(api_url = http.api_url.as_str(), "email provider: http");
            let http_client = reqwest::Client::builder()
                .timeout(config.email_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build email http client: {error}"))
                })?;
            Arc::new(HttpEmailProvider::new(
                http_client,
                HttpEmailConfig {
                    api_url: http.api_url.clone(),
                    api_key: http.api_key.clone(),
                    from_address: from_address.clone(),
                },
            ))
        }
    };

    Ok(provider)
}
