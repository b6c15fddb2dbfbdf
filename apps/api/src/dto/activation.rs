use retailhub_domain::RetailerAccount;
use serde::Serialize;
use ts_rs::TS;

/// Result of a redeemed activation link.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/activation-response.ts"
)]
pub struct ActivationResponse {
    pub success: bool,
    pub retailer_id: String,
    pub business_name: String,
    pub status: String,
}

impl From<RetailerAccount> for ActivationResponse {
    fn from(value: RetailerAccount) -> Self {
        Self {
            success: true,
            retailer_id: value.id.to_string(),
            business_name: value.business_name,
            status: value.status.as_str().to_owned(),
        }
    }
}
