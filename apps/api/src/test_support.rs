use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use retailhub_application::{EmailProvider, OutboundEmail, ProviderReceipt};
use retailhub_core::{AppError, AppResult, UserIdentity};
use retailhub_domain::{ActorRole, RetailerAccount, RetailerId, RetailerStatus};
use retailhub_infrastructure::{
    InMemoryActivationTokenRepository, InMemoryAuthorizationRepository,
    InMemoryEmailDispatchRepository, InMemoryInvitationRepository, InMemoryRetailerRepository,
};
use sqlx::postgres::PgPoolOptions;

use crate::api_config::ApiConfig;
use crate::api_services::{ServicePorts, assemble_app_state};
use crate::state::AppState;

pub const ADMIN_SUBJECT: &str = "admin-1";
pub const FRONTEND_URL: &str = "https://retailhub.nl";

pub fn admin() -> UserIdentity {
    UserIdentity::new(ADMIN_SUBJECT, "Sanne", Some("sanne@retailhub.nl".to_owned()))
}

pub fn outsider() -> UserIdentity {
    UserIdentity::new("shop-42", "Shop 42", None)
}

/// Email provider that keeps every message it was handed.
#[derive(Default)]
pub struct RecordingEmailProvider {
    failure: Option<String>,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingEmailProvider {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt> {
        if let Some(message) = &self.failure {
            return Err(AppError::Dependency(message.clone()));
        }

        let mut sent = lock(&self.sent);
        sent.push(email.clone());
        Ok(ProviderReceipt {
            provider_reference: Some(format!("msg-{}", sent.len())),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct TestApp {
    pub state: AppState,
    pub invitations: Arc<InMemoryInvitationRepository>,
    pub retailers: Arc<InMemoryRetailerRepository>,
    pub dispatch_log: Arc<InMemoryEmailDispatchRepository>,
    pub email_provider: Arc<RecordingEmailProvider>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_provider(RecordingEmailProvider::accepting()).await
    }

    pub async fn with_provider(email_provider: RecordingEmailProvider) -> Self {
        let config = ApiConfig::from_lookup(|name| match name {
            "DATABASE_URL" => Some("postgres://localhost/retailhub_test".to_owned()),
            "FRONTEND_URL" => Some(FRONTEND_URL.to_owned()),
            "PUBLIC_API_URL" => Some("https://api.retailhub.nl".to_owned()),
            _ => None,
        })
        .unwrap_or_else(|_| unreachable!());

        let invitations = Arc::new(InMemoryInvitationRepository::new());
        let retailers = Arc::new(InMemoryRetailerRepository::new());
        let dispatch_log = Arc::new(InMemoryEmailDispatchRepository::new());
        let authorization = Arc::new(InMemoryAuthorizationRepository::new());
        authorization.grant(ADMIN_SUBJECT, ActorRole::Admin).await;
        let email_provider = Arc::new(email_provider);

        let ports = ServicePorts {
            invitation_repository: invitations.clone(),
            retailer_repository: retailers.clone(),
            activation_token_repository: Arc::new(InMemoryActivationTokenRepository::new(
                retailers.clone(),
            )),
            authorization_repository: authorization,
            email_dispatch_repository: dispatch_log.clone(),
            email_provider: email_provider.clone(),
        };

        // Lazy pools never connect unless a query runs.
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap_or_else(|_| unreachable!());
        let state = assemble_app_state(ports, pool, &config).unwrap_or_else(|_| unreachable!());

        Self {
            state,
            invitations,
            retailers,
            dispatch_log,
            email_provider,
        }
    }

    pub async fn seed_retailer(&self, email: &str, status: RetailerStatus) -> RetailerId {
        let now = Utc::now();
        let retailer = RetailerAccount {
            id: RetailerId::new(),
            business_name: "Bloemenhuis De Tulp".to_owned(),
            contact_name: "Jan de Vries".to_owned(),
            email: email.to_owned(),
            phone: None,
            address: None,
            status,
            created_at: now,
            updated_at: now,
        };
        let retailer_id = retailer.id;
        self.retailers.insert(retailer).await;
        retailer_id
    }
}

/// Extracts the hex activation token from an approval email body.
pub fn activation_token_from(body: &str) -> Option<String> {
    let start = body.find("/activate/")? + "/activate/".len();
    let token: String = body[start..]
        .chars()
        .take_while(char::is_ascii_hexdigit)
        .collect();
    (!token.is_empty()).then_some(token)
}
