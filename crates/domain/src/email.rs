//! Transactional email kinds and dispatch records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retailhub_core::AppError;
use serde::{Deserialize, Serialize};

/// Template families sent by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplateKind {
    /// Outreach invitation to a prospect.
    ColdOutreach,
    /// Retailer approval with activation link.
    Approved,
    /// Retailer rejection with reason.
    Rejected,
}

impl EmailTemplateKind {
    /// Returns the storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColdOutreach => "cold_outreach",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for EmailTemplateKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cold_outreach" => Ok(Self::ColdOutreach),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown email template kind '{value}'"
            ))),
        }
    }
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDispatchRecord {
    /// Recipient address.
    pub recipient: String,
    /// Template that was rendered.
    pub template_kind: EmailTemplateKind,
    /// When the attempt started.
    pub attempted_at: DateTime<Utc>,
    /// Whether the provider accepted the message.
    pub succeeded: bool,
    /// Provider message id, when one was returned.
    pub provider_reference: Option<String>,
    /// Failure detail.
    pub error: Option<String>,
}
