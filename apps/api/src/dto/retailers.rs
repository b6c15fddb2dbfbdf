use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::EmailDetailsResponse;

/// Incoming payload for a retailer review decision.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/notify-retailer-request.ts"
)]
pub struct NotifyRetailerRequest {
    pub retailer_id: Option<String>,
    /// `approve` or `reject`.
    pub action: Option<String>,
    pub reason: Option<String>,
}

/// Review decision result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/notify-retailer-response.ts"
)]
pub struct NotifyRetailerResponse {
    pub success: bool,
    pub message: String,
    pub retailer_id: String,
    pub status: String,
    pub email_sent: bool,
    pub email_details: EmailDetailsResponse,
    pub activation_expires_at: Option<String>,
}
