use axum::Json;
use axum::extract::{Extension, Query, State};
use retailhub_core::{AppError, UserIdentity};
use retailhub_domain::InvitationStatus;

use crate::dto::{
    CreateInvitationsRequest, CreateInvitationsResponse, InvitationEntryErrorResponse,
    InvitationListQuery, InvitationResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn list_invitations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<InvitationListQuery>,
) -> ApiResult<Json<Vec<InvitationResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(InvitationStatus::from_transport)
        .transpose()?;

    let invitations = state
        .invitation_service
        .list_invitations(&user, status)
        .await?
        .into_iter()
        .map(InvitationResponse::from)
        .collect();

    Ok(Json(invitations))
}

pub async fn create_invitations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateInvitationsRequest>,
) -> ApiResult<Json<CreateInvitationsResponse>> {
    if payload.invitations.is_empty() {
        return Err(
            AppError::Validation("at least one invitation is required".to_owned()).into(),
        );
    }

    let requests = payload.invitations.into_iter().map(Into::into).collect();
    let (created, errors) = state
        .invitation_service
        .create_invitations(&user, requests, payload.send_emails)
        .await?
        .into_parts();

    let errors: Vec<InvitationEntryErrorResponse> =
        errors.into_iter().map(InvitationEntryErrorResponse::from).collect();

    Ok(Json(CreateInvitationsResponse {
        success: true,
        created: created.len(),
        errors: (!errors.is_empty()).then_some(errors),
        invitations: created.into_iter().map(InvitationResponse::from).collect(),
    }))
}
