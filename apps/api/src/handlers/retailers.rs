use axum::Json;
use axum::extract::{Extension, State};
use retailhub_application::ReviewAction;
use retailhub_core::{AppError, UserIdentity};
use retailhub_domain::{RetailerId, RetailerStatus};

use crate::dto::{EmailDetailsResponse, NotifyRetailerRequest, NotifyRetailerResponse};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn notify_retailer_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<NotifyRetailerRequest>,
) -> ApiResult<Json<NotifyRetailerResponse>> {
    let retailer_id = payload
        .retailer_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("retailerId is required".to_owned()))?;
    let retailer_id = RetailerId::parse(retailer_id)?;
    let action = review_action(payload.action.as_deref(), payload.reason)?;

    let outcome = state
        .approval_service
        .review(&user, retailer_id, action)
        .await?;

    let email_sent = outcome.email.succeeded;
    let message = match (outcome.retailer.status, email_sent) {
        (RetailerStatus::Approved, true) => "retailer approved and notified",
        (RetailerStatus::Approved, false) => "retailer approved; notification email was not sent",
        (_, true) => "retailer rejected and notified",
        (_, false) => "retailer rejected; notification email was not sent",
    };

    Ok(Json(NotifyRetailerResponse {
        success: true,
        message: message.to_owned(),
        retailer_id: outcome.retailer.id.to_string(),
        status: outcome.retailer.status.as_str().to_owned(),
        email_sent,
        email_details: EmailDetailsResponse::from(outcome.email),
        activation_expires_at: outcome
            .activation_expires_at
            .map(|expires_at| expires_at.to_rfc3339()),
    }))
}

fn review_action(action: Option<&str>, reason: Option<String>) -> Result<ReviewAction, AppError> {
    match action.map(str::trim) {
        Some("approve") => Ok(ReviewAction::Approve),
        Some("reject") => Ok(ReviewAction::Reject { reason }),
        _ => Err(AppError::Validation(
            "action must be 'approve' or 'reject'".to_owned(),
        )),
    }
}
