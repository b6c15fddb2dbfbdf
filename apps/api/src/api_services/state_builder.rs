use std::sync::Arc;

use retailhub_application::{
    ActivationService, ActivationTokenRepository, AuthorizationRepository, AuthorizationService,
    EmailDispatchRepository, EmailDispatcher, EmailProvider, InvitationRepository,
    InvitationService, PublicLinks, RetailerApprovalService, RetailerRepository, TokenService,
};
use retailhub_core::AppError;
use retailhub_infrastructure::{
    PostgresActivationTokenRepository, PostgresAuthorizationRepository,
    PostgresEmailDispatchRepository, PostgresInvitationRepository, PostgresRetailerRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::email::build_email_provider;

/// Adapters behind every application port.
pub struct ServicePorts {
    pub invitation_repository: Arc<dyn InvitationRepository>,
    pub retailer_repository: Arc<dyn RetailerRepository>,
    pub activation_token_repository: Arc<dyn ActivationTokenRepository>,
    pub authorization_repository: Arc<dyn AuthorizationRepository>,
    pub email_dispatch_repository: Arc<dyn EmailDispatchRepository>,
    pub email_provider: Arc<dyn EmailProvider>,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let ports = ServicePorts {
        invitation_repository: Arc::new(PostgresInvitationRepository::new(pool.clone())),
        retailer_repository: Arc::new(PostgresRetailerRepository::new(pool.clone())),
        activation_token_repository: Arc::new(PostgresActivationTokenRepository::new(
            pool.clone(),
        )),
        authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        email_dispatch_repository: Arc::new(PostgresEmailDispatchRepository::new(pool.clone())),
        email_provider: build_email_provider(config)?,
    };

    assemble_app_state(ports, pool, config)
}

pub fn assemble_app_state(
    ports: ServicePorts,
    pool: PgPool,
    config: &ApiConfig,
) -> Result<AppState, AppError> {
    let links = PublicLinks::new(&config.frontend_url, &config.public_api_url)?;
    let authorization_service = AuthorizationService::new(ports.authorization_repository);
    let token_service = TokenService::new();
    let email_dispatcher = EmailDispatcher::new(ports.email_provider, config.email_timeout)
        .with_dispatch_log(ports.email_dispatch_repository);

    let activation_service =
        ActivationService::new(ports.activation_token_repository, token_service)
            .with_ttl(config.activation_token_ttl);

    Ok(AppState {
        invitation_service: InvitationService::new(
            authorization_service.clone(),
            ports.invitation_repository,
            token_service,
            email_dispatcher.clone(),
            links.clone(),
        ),
        approval_service: RetailerApprovalService::new(
            authorization_service,
            ports.retailer_repository,
            activation_service.clone(),
            email_dispatcher,
            links,
        ),
        activation_service,
        postgres_pool: pool,
        frontend_url: config.frontend_url.clone(),
    })
}
