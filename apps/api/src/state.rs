use retailhub_application::{ActivationService, InvitationService, RetailerApprovalService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub invitation_service: InvitationService,
    pub approval_service: RetailerApprovalService,
    pub activation_service: ActivationService,
    pub postgres_pool: PgPool,
    pub frontend_url: String,
}
