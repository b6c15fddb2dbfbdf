//! Activation token issuance and redemption.
//!
//! Raw tokens leave the process only inside the approval email; storage keeps
//! the SHA-256 hash. Issuing a token supersedes every open token of the same
//! retailer, so only the newest link can be redeemed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use retailhub_core::{AppError, AppResult};
use retailhub_domain::{
    ActivationToken, DEFAULT_ACTIVATION_TOKEN_TTL_DAYS, RetailerAccount, RetailerId,
    TokenPurpose,
};
use tracing::{info, warn};

use crate::retailer_ports::{ActivationRedemption, ActivationTokenRepository, NewActivationToken};
use crate::token_service::{TokenService, hash_token};

/// Freshly issued token; the raw value is only available here.
#[derive(Debug, Clone)]
pub struct IssuedActivationToken {
    /// Raw token for the activation URL.
    pub raw_token: String,
    /// Persisted record.
    pub record: ActivationToken,
}

/// Application service for the activation token lifecycle.
#[derive(Clone)]
pub struct ActivationService {
    token_repository: Arc<dyn ActivationTokenRepository>,
    token_service: TokenService,
    ttl: Duration,
}

impl ActivationService {
    /// Creates an activation service with the default seven day lifetime.
    #[must_use]
    pub fn new(
        token_repository: Arc<dyn ActivationTokenRepository>,
        token_service: TokenService,
    ) -> Self {
        Self {
            token_repository,
            token_service,
            ttl: Duration::days(DEFAULT_ACTIVATION_TOKEN_TTL_DAYS),
        }
    }

    /// Overrides the token lifetime. Non-positive values keep the default.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        if ttl > Duration::zero() {
            self.ttl = ttl;
        }
        self
    }

    /// Issues a new token for the retailer, superseding older ones.
    pub async fn issue(&self, retailer_id: RetailerId) -> AppResult<IssuedActivationToken> {
        let raw_token = self.token_service.issue(TokenPurpose::Activation)?;
        let issued_at = Utc::now();

        let record = self
            .token_repository
            .issue_token(NewActivationToken {
                retailer_id,
                token_hash: hash_token(&raw_token),
                issued_at,
                expires_at: ActivationToken::expiry_from(issued_at, self.ttl),
            })
            .await?;

        info!(%retailer_id, expires_at = %record.expires_at, "activation token issued");

        Ok(IssuedActivationToken { raw_token, record })
    }

    /// Redeems a raw token and returns the retailer it belongs to.
    ///
    /// Fails with `NotFound` for unknown tokens, `Conflict` when the token was
    /// already redeemed and `Expired` when it lapsed or was superseded.
    pub async fn redeem(&self, raw_token: &str) -> AppResult<RetailerId> {
        let token_hash = hash_raw_token(raw_token)?;
        let now = Utc::now();

        if let Some(redeemed) = self.token_repository.redeem_token(&token_hash, now).await? {
            info!(retailer_id = %redeemed.retailer_id, "activation token redeemed");
            return Ok(redeemed.retailer_id);
        }

        self.explain_unavailable(&token_hash, now).await
    }

    /// Redeems a token and promotes the retailer from `approved` to `active`.
    ///
    /// Both writes share one transaction, so a failed attempt leaves the token
    /// open and can be retried with the same link.
    pub async fn activate(&self, raw_token: &str) -> AppResult<RetailerAccount> {
        let token_hash = hash_raw_token(raw_token)?;
        let now = Utc::now();

        match self
            .token_repository
            .redeem_and_activate(&token_hash, now)
            .await?
        {
            ActivationRedemption::Activated(retailer) => {
                info!(retailer_id = %retailer.id, "retailer activated");
                Ok(retailer)
            }
            ActivationRedemption::NotAwaitingActivation {
                retailer_id,
                status: Some(status),
            } => {
                warn!(
                    %retailer_id,
                    status = status.as_str(),
                    "activation attempted for retailer that is not awaiting activation"
                );
                Err(AppError::Conflict(format!(
                    "retailer '{retailer_id}' is '{}' and cannot be activated",
                    status.as_str()
                )))
            }
            ActivationRedemption::NotAwaitingActivation {
                retailer_id,
                status: None,
            } => Err(AppError::NotFound(format!(
                "retailer '{retailer_id}' not found"
            ))),
            ActivationRedemption::TokenUnavailable => {
                self.explain_unavailable(&token_hash, now).await
            }
        }
    }

    /// Maps a token that did not qualify for redemption to its error.
    async fn explain_unavailable<T>(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<T> {
        let existing = self
            .token_repository
            .find_by_hash(token_hash)
            .await?
            .ok_or_else(|| AppError::NotFound("activation token not found".to_owned()))?;

        existing.check_redeemable(now)?;

        // The conditional update lost a race that the re-read no longer shows.
        Err(AppError::Conflict(
            "activation token has already been redeemed".to_owned(),
        ))
    }
}

fn hash_raw_token(raw_token: &str) -> AppResult<String> {
    let raw_token = raw_token.trim();
    if raw_token.is_empty() {
        return Err(AppError::NotFound("activation token not found".to_owned()));
    }

    Ok(hash_token(raw_token))
}
