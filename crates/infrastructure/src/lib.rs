//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_provider;
mod http_email_provider;
mod in_memory_repositories;
mod postgres_authorization_repository;
mod postgres_email_dispatch_repository;
mod postgres_invitation_repository;
mod postgres_retailer_repository;
mod smtp_email_provider;

pub use console_email_provider::ConsoleEmailProvider;
pub use http_email_provider::{HttpEmailConfig, HttpEmailProvider};
pub use in_memory_repositories::{
    InMemoryActivationTokenRepository, InMemoryAuthorizationRepository,
    InMemoryEmailDispatchRepository, InMemoryInvitationRepository, InMemoryRetailerRepository,
};
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_email_dispatch_repository::PostgresEmailDispatchRepository;
pub use postgres_invitation_repository::PostgresInvitationRepository;
pub use postgres_retailer_repository::{
    PostgresActivationTokenRepository, PostgresRetailerRepository,
};
pub use smtp_email_provider::{SmtpEmailConfig, SmtpEmailProvider};
