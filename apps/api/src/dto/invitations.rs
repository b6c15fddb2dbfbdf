use retailhub_application::{CreatedInvitation, InvitationEntryError, InvitationRequest};
use retailhub_domain::Invitation;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::EmailDetailsResponse;

/// Query string for invitation listing.
#[derive(Debug, Default, Deserialize)]
pub struct InvitationListQuery {
    pub status: Option<String>,
}

/// One invitation in a batch create request.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invitation-input.ts"
)]
pub struct InvitationInput {
    pub email: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Incoming payload for batch invitation creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-invitations-request.ts"
)]
pub struct CreateInvitationsRequest {
    #[serde(default)]
    pub invitations: Vec<InvitationInput>,
    #[serde(default = "send_emails_default")]
    pub send_emails: bool,
}

fn send_emails_default() -> bool {
    true
}

/// API representation of an invitation.
///
/// Redemption and tracking secrets stay server-side.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invitation-response.ts"
)]
pub struct InvitationResponse {
    pub id: String,
    pub email: String,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub invited_by: String,
    pub email_sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[ts(type = "Record<string, unknown>")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email_details: Option<EmailDetailsResponse>,
}

/// Rejected batch entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invitation-entry-error-response.ts"
)]
pub struct InvitationEntryErrorResponse {
    pub email: String,
    pub reason: String,
}

/// Batch invitation creation result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-invitations-response.ts"
)]
pub struct CreateInvitationsResponse {
    pub success: bool,
    pub created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub errors: Option<Vec<InvitationEntryErrorResponse>>,
    pub invitations: Vec<InvitationResponse>,
}

impl From<InvitationInput> for InvitationRequest {
    fn from(value: InvitationInput) -> Self {
        Self {
            email: value.email,
            business_name: value.business_name,
            contact_name: value.contact_name,
            phone: value.phone,
            metadata: value.metadata,
        }
    }
}

impl From<Invitation> for InvitationResponse {
    fn from(value: Invitation) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email.as_str().to_owned(),
            business_name: value.business_name,
            contact_name: value.contact_name,
            phone: value.phone,
            status: value.status.as_str().to_owned(),
            invited_by: value.invited_by,
            email_sent_at: value.email_sent_at.map(|sent_at| sent_at.to_rfc3339()),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            metadata: value.metadata,
            email_details: None,
        }
    }
}

impl From<CreatedInvitation> for InvitationResponse {
    fn from(value: CreatedInvitation) -> Self {
        let mut response = Self::from(value.invitation);
        response.email_details = value.email.map(EmailDetailsResponse::from);
        response
    }
}

impl From<InvitationEntryError> for InvitationEntryErrorResponse {
    fn from(value: InvitationEntryError) -> Self {
        Self {
            email: value.email,
            reason: value.reason,
        }
    }
}
