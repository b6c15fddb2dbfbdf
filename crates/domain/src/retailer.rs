//! Retailer accounts and the approval state machine rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retailhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EmailAddress;

/// Retailer identifier, shared with the authentication identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetailerId(Uuid);

impl RetailerId {
    /// Creates a new random retailer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a retailer identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a retailer identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid retailer id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RetailerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RetailerId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Retailer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetailerStatus {
    /// Registered, awaiting admin review.
    Pending,
    /// Approved by an admin; waiting for activation token redemption.
    Approved,
    /// Activation token redeemed; dashboard access granted.
    Active,
    /// Rejected by an admin.
    Rejected,
}

impl RetailerStatus {
    /// Returns the storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Rejected => "rejected",
        }
    }

    /// Source statuses a transition to `target` may start from.
    ///
    /// Re-approving an approved retailer and re-rejecting a rejected one are
    /// allowed so a failed notification can be retried.
    #[must_use]
    pub fn transition_sources(target: Self) -> &'static [Self] {
        match target {
            Self::Pending => &[],
            Self::Approved => &[Self::Pending, Self::Approved],
            Self::Active => &[Self::Approved],
            Self::Rejected => &[Self::Pending, Self::Rejected],
        }
    }

    /// Returns whether moving from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        Self::transition_sources(next).contains(&self)
    }
}

impl FromStr for RetailerStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown retailer status '{value}'"
            ))),
        }
    }
}

/// Registered retailer business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerAccount {
    /// Retailer identifier.
    pub id: RetailerId,
    /// Registered business name.
    pub business_name: String,
    /// Contact person.
    pub contact_name: String,
    /// Contact email as captured at registration; may be blank in legacy rows.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Current status.
    pub status: RetailerStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RetailerAccount {
    /// Returns the address notifications are sent to.
    ///
    /// Fails with a validation error when the account has no email, which must
    /// be checked before any status transition.
    pub fn notification_email(&self) -> AppResult<EmailAddress> {
        if self.email.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "retailer '{}' has no email address",
                self.id
            )));
        }

        EmailAddress::new(self.email.as_str())
    }
}
