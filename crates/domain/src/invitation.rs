//! Outreach invitation records and their engagement lifecycle.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retailhub_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EmailAddress;

/// Unique identifier for an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(Uuid);

impl InvitationId {
    /// Creates a new random invitation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an invitation identifier from an existing UUID value.
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

impl Default for InvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Invitation status.
///
/// `Pending -> Sent -> Opened -> Clicked` is the engagement ladder and only
/// ever moves upwards. `Registered` and `Expired` resolve the invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Created, no email dispatch attempted yet.
    Pending,
    /// Dispatch of the outreach email was attempted.
    Sent,
    /// Tracking pixel was fetched.
    Opened,
    /// Tracked link was followed.
    Clicked,
    /// Recipient registered a retailer account.
    Registered,
    /// Invitation aged out without registration.
    Expired,
}

impl InvitationStatus {
    /// Statuses that still block a new invitation for the same email.
    pub const UNRESOLVED: [Self; 4] = [Self::Pending, Self::Sent, Self::Opened, Self::Clicked];

    /// Returns the storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Opened => "opened",
            Self::Clicked => "clicked",
            Self::Registered => "registered",
            Self::Expired => "expired",
        }
    }

    /// Returns whether the invitation is still open.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        Self::UNRESOLVED.contains(self)
    }

    /// Position on the engagement ladder; resolved statuses have none.
    fn engagement_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Sent => Some(1),
            Self::Opened => Some(2),
            Self::Clicked => Some(3),
            Self::Registered | Self::Expired => None,
        }
    }

    /// Returns whether moving from `self` to `next` is allowed.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self.engagement_rank(), next.engagement_rank()) {
            (Some(current), Some(target)) => target > current,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Statuses from which a conditional update to `target` may proceed.
    ///
    /// Storage adapters use this as the compare-and-set predicate so that a
    /// late event can never move an invitation down the ladder.
    #[must_use]
    pub fn escalation_sources(target: Self) -> &'static [Self] {
        match target {
            Self::Pending => &[],
            Self::Sent => &[Self::Pending],
            Self::Opened => &[Self::Sent],
            Self::Clicked => &[Self::Sent, Self::Opened],
            Self::Registered | Self::Expired => &Self::UNRESOLVED,
        }
    }

    /// Parses a transport value into a status.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for InvitationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "opened" => Ok(Self::Opened),
            "clicked" => Ok(Self::Clicked),
            "registered" => Ok(Self::Registered),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown invitation status '{value}'"
            ))),
        }
    }
}

/// Outreach invitation as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// Invitation identifier.
    pub id: InvitationId,
    /// Canonical recipient address.
    pub email: EmailAddress,
    /// Prospect business name.
    pub business_name: Option<String>,
    /// Prospect contact person.
    pub contact_name: Option<String>,
    /// Prospect phone number.
    pub phone: Option<String>,
    /// Current status.
    pub status: InvitationStatus,
    /// Redemption secret carried by the registration link.
    pub invitation_token: String,
    /// Identifier embedded in the open-tracking pixel URL.
    pub tracking_pixel_id: String,
    /// Identifier embedded in the click-tracking URL.
    pub click_tracking_id: String,
    /// Subject of the staff actor that created the invitation.
    pub invited_by: String,
    /// Set only when the outreach email was accepted by the provider.
    pub email_sent_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Free-form provenance (e.g. `created_via`, `import_batch`).
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
