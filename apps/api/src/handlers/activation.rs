use axum::Json;
use axum::extract::{Path, State};

use crate::dto::ActivationResponse;
use crate::error::ApiResult;
use crate::state::AppState;


/// Redeems an activation link and activates the retailer account.
///
/// Expired links answer 410, reused links 409 and unknown links 404.
pub async fn activate_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ActivationResponse>> {
    let retailer = state.activation_service.activate(&token).await?;
    Ok(Json(ActivationResponse::from(retailer)))
}
