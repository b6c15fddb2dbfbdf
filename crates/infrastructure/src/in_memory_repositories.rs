//! In-memory adapters for local development and handler tests.
//!
//! They enforce the same uniqueness and conditional-update rules as the
//! PostgreSQL adapters, with a single write lock standing in for row locks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_application::{
    ActivationRedemption, ActivationTokenRepository, AuthorizationRepository,
    EmailDispatchRepository, InvitationRepository, NewActivationToken, NewInvitation,
    RetailerRepository,
};
use retailhub_core::{AppError, AppResult};
use retailhub_domain::{
    ActivationToken, ActivationTokenId, ActorRole, EmailDispatchRecord, Invitation, InvitationId,
    InvitationStatus, RetailerAccount, RetailerId, RetailerStatus,
};
use tokio::sync::RwLock;

mod invitations;
mod retailers;


/// In-memory invitation ledger.
#[derive(Debug, Default)]
pub struct InMemoryInvitationRepository {
    invitations: RwLock<HashMap<InvitationId, Invitation>>,
}

impl InMemoryInvitationRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory retailer accounts.
#[derive(Debug, Default)]
pub struct InMemoryRetailerRepository {
    retailers: RwLock<HashMap<RetailerId, RetailerAccount>>,
}

impl InMemoryRetailerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a retailer account.
    pub async fn insert(&self, account: RetailerAccount) {
        self.retailers.write().await.insert(account.id, account);
    }
}

/// In-memory activation tokens.
///
/// Holds the retailer store so activation can redeem and promote under both
/// write locks.
#[derive(Debug)]
pub struct InMemoryActivationTokenRepository {
    tokens: RwLock<Vec<ActivationToken>>,
    retailers: Arc<InMemoryRetailerRepository>,
}

impl InMemoryActivationTokenRepository {
    /// Creates an empty repository backed by `retailers`.
    #[must_use]
    pub fn new(retailers: Arc<InMemoryRetailerRepository>) -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
            retailers,
        }
    }
}

/// In-memory role assignments.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationRepository {
    roles: RwLock<HashMap<String, ActorRole>>,
}

impl InMemoryAuthorizationRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `role` to `subject`.
    pub async fn grant(&self, subject: &str, role: ActorRole) {
        self.roles.write().await.insert(subject.to_owned(), role);
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn find_role(&self, subject: &str) -> AppResult<Option<ActorRole>> {
        Ok(self.roles.read().await.get(subject).copied())
    }
}

/// In-memory email dispatch log.
#[derive(Debug, Default)]
pub struct InMemoryEmailDispatchRepository {
    records: RwLock<Vec<EmailDispatchRecord>>,
}

impl InMemoryEmailDispatchRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded attempt in insertion order.
    pub async fn records(&self) -> Vec<EmailDispatchRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl EmailDispatchRepository for InMemoryEmailDispatchRepository {
    async fn record_dispatch(&self, record: &EmailDispatchRecord) -> AppResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
