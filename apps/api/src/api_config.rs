use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use retailhub_core::AppError;
use tracing_subscriber::EnvFilter;

/// Maintenance command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    MigrateOnly,
    ExpireInvitations,
}

impl RunMode {
    fn from_argument(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None => Ok(Self::Serve),
            Some("migrate") => Ok(Self::MigrateOnly),
            Some("expire-invitations") => Ok(Self::ExpireInvitations),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'migrate' or 'expire-invitations'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct HttpEmailRuntimeConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp {
        smtp: SmtpRuntimeConfig,
        from_address: String,
    },
    Http {
        http: HttpEmailRuntimeConfig,
        from_address: String,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub run_mode: RunMode,
    pub database_url: String,
    pub frontend_url: String,
    pub public_api_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub email_provider: EmailProviderConfig,
    pub email_timeout: Duration,
    pub activation_token_ttl: chrono::Duration,
    pub invitation_expiry: chrono::Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.run_mode = RunMode::from_argument(env::args().nth(1).as_deref())?;
        Ok(config)
    }

    /// Builds the configuration from a variable lookup, defaulting to `serve`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let variables = Variables { lookup: &lookup };

        let database_url = variables.required_non_empty("DATABASE_URL")?;
        let frontend_url = variables.or_default("FRONTEND_URL", "http://localhost:3000");
        let public_api_url = variables.or_default("PUBLIC_API_URL", "http://localhost:3001");
        let api_host = variables.or_default("API_HOST", "127.0.0.1");
        let api_port = variables.parsed_or("API_PORT", 3001_u16)?;
        let cookie_secure = variables
            .or_default("SESSION_COOKIE_SECURE", "false")
            .eq_ignore_ascii_case("true");

        let email_provider = match variables.or_default("EMAIL_PROVIDER", "console").as_str() {
            "console" => EmailProviderConfig::Console,
            "smtp" => EmailProviderConfig::Smtp {
                smtp: SmtpRuntimeConfig {
                    host: variables.required_non_empty("SMTP_HOST")?,
                    port: variables
                        .required_non_empty("SMTP_PORT")?
                        .parse::<u16>()
                        .map_err(|error| {
                            AppError::Validation(format!("invalid SMTP_PORT: {error}"))
                        })?,
                    username: variables.required_non_empty("SMTP_USERNAME")?,
                    password: variables.required_non_empty("SMTP_PASSWORD")?,
                },
                from_address: variables.required_non_empty("EMAIL_FROM_ADDRESS")?,
            },
            "http" => EmailProviderConfig::Http {
                http: HttpEmailRuntimeConfig {
                    api_url: variables.required_non_empty("EMAIL_API_URL")?,
                    api_key: variables.required_non_empty("EMAIL_API_KEY")?,
                },
                from_address: variables.required_non_empty("EMAIL_FROM_ADDRESS")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be one of 'console', 'smtp' or 'http', got '{other}'"
                )));
            }
        };

        let email_timeout_seconds = variables.parsed_or("EMAIL_TIMEOUT_SECONDS", 10_u64)?;
        let activation_token_ttl_days = variables.positive_days("ACTIVATION_TOKEN_TTL_DAYS", 7)?;
        let invitation_expiry_days = variables.positive_days("INVITATION_EXPIRY_DAYS", 30)?;

        Ok(Self {
            run_mode: RunMode::Serve,
            database_url,
            frontend_url,
            public_api_url,
            api_host,
            api_port,
            cookie_secure,
            email_provider,
            email_timeout: Duration::from_secs(email_timeout_seconds.clamp(1, 10)),
            activation_token_ttl: chrono::Duration::days(activation_token_ttl_days),
            invitation_expiry: chrono::Duration::days(invitation_expiry_days),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct Variables<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Variables<'_, F> {
    fn or_default(&self, name: &str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_owned())
    }

    fn required_non_empty(&self, name: &str) -> Result<String, AppError> {
        let value =
            (self.lookup)(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} must not be empty")));
        }

        Ok(value)
    }

    fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(name) {
            Some(value) if !value.trim().is_empty() => value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
            _ => Ok(default),
        }
    }

    fn positive_days(&self, name: &str, default: i64) -> Result<i64, AppError> {
        let days = self.parsed_or(name, default)?;
        if days <= 0 {
            return Err(AppError::Validation(format!(
                "{name} must be a positive number of days"
            )));
        }

        Ok(days)
    }
}
