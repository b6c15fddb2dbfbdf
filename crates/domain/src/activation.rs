//! Single-use activation tokens that promote approved retailers.

use chrono::{DateTime, Duration, Utc};
use retailhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RetailerId;

/// Default lifetime of an activation token.
pub const DEFAULT_ACTIVATION_TOKEN_TTL_DAYS: i64 = 7;

/// Unique identifier for an activation token row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationTokenId(Uuid);

impl ActivationTokenId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ActivationTokenId {
    fn default() -> Self {
        Self::new()
    }
}

/// Activation token as persisted. Only the SHA-256 hash of the secret is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationToken {
    /// Token identifier.
    pub id: ActivationTokenId,
    /// Retailer the token activates.
    pub retailer_id: RetailerId,
    /// Hex SHA-256 of the raw token.
    pub token_hash: String,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Set once by the activation flow.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Set when a newer token was issued for the same retailer.
    pub superseded_at: Option<DateTime<Utc>>,
}

impl ActivationToken {
    /// Computes the expiry for a token issued at `issued_at`.
    #[must_use]
    pub fn expiry_from(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        issued_at + ttl
    }

    /// Returns whether the token could still be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.check_redeemable(now).is_ok()
    }

    /// Validates that the token can be redeemed at `now`.
    ///
    /// Redeemed tokens report a conflict; superseded and lapsed tokens report
    /// expiry.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> AppResult<()> {
        if self.redeemed_at.is_some() {
            return Err(AppError::Conflict(
                "activation token has already been redeemed".to_owned(),
            ));
        }

        if self.superseded_at.is_some() {
            return Err(AppError::Expired(
                "activation token was superseded by a newer token".to_owned(),
            ));
        }

        if self.expires_at <= now {
            return Err(AppError::Expired("activation token has expired".to_owned()));
        }

        Ok(())
    }
}
