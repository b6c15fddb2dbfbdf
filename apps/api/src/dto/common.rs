use retailhub_application::DispatchOutcome;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Outcome of one notification attempt.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/email-details-response.ts"
)]
pub struct EmailDetailsResponse {
    pub template: String,
    pub sent: bool,
    pub attempted_at: String,
    pub provider_reference: Option<String>,
    pub error: Option<String>,
}

impl From<DispatchOutcome> for EmailDetailsResponse {
    fn from(value: DispatchOutcome) -> Self {
        Self {
            template: value.template_kind.as_str().to_owned(),
            sent: value.succeeded,
            attempted_at: value.attempted_at.to_rfc3339(),
            provider_reference: value.provider_reference,
            error: value.error,
        }
    }
}
