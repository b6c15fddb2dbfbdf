mod activation;
mod common;
mod invitations;
mod retailers;

pub use activation::ActivationResponse;
pub use common::{EmailDetailsResponse, HealthDependencyStatus, HealthResponse};
pub use invitations::{
    CreateInvitationsRequest, CreateInvitationsResponse, InvitationEntryErrorResponse,
    InvitationInput, InvitationListQuery, InvitationResponse,
};
pub use retailers::{NotifyRetailerRequest, NotifyRetailerResponse};
