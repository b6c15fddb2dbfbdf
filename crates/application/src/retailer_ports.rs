//! Ports for retailer accounts and activation tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_core::AppResult;
use retailhub_domain::{ActivationToken, RetailerAccount, RetailerId, RetailerStatus};

/// Repository port for retailer accounts.
#[async_trait]
pub trait RetailerRepository: Send + Sync {
    /// Finds a retailer by id.
    async fn find_retailer(&self, retailer_id: RetailerId) -> AppResult<Option<RetailerAccount>>;

    /// Sets `target` only if the current status is one of
    /// [`RetailerStatus::transition_sources`].
    ///
    /// Returns the updated account, or `None` when the retailer is missing or
    /// its status did not match.
    async fn transition_status(
        &self,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<Option<RetailerAccount>>;
}

/// Insert payload for a new activation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivationToken {
    /// Retailer the token activates.
    pub retailer_id: RetailerId,
    /// Hex SHA-256 of the raw token.
    pub token_hash: String,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Result of redeeming a token and activating its retailer together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationRedemption {
    /// The token was stamped and the retailer moved to `active`.
    Activated(RetailerAccount),
    /// The token qualified but its retailer was not `approved`. Nothing was
    /// written; `status` is `None` when the retailer no longer exists.
    NotAwaitingActivation {
        /// Retailer the token belongs to.
        retailer_id: RetailerId,
        /// Status observed inside the transaction.
        status: Option<RetailerStatus>,
    },
    /// No open, unexpired token matched the hash.
    TokenUnavailable,
}

/// Repository port for activation tokens.
#[async_trait]
pub trait ActivationTokenRepository: Send + Sync {
    /// Supersedes every open token of the retailer and inserts the new one,
    /// atomically.
    async fn issue_token(&self, token: NewActivationToken) -> AppResult<ActivationToken>;

    /// Finds a token by hash regardless of its state.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<ActivationToken>>;

    /// Stamps `redeemed_at` if the token is open and unexpired at `now`.
    ///
    /// Returns `None` when no row qualified; exactly one concurrent caller can
    /// observe `Some`.
    async fn redeem_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>>;

    /// Stamps `redeemed_at` and moves the owning retailer `approved -> active`
    /// in one transaction. Either both writes happen or neither does.
    async fn redeem_and_activate(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ActivationRedemption>;
}
