//! Application services and ports.

#![forbid(unsafe_code)]

mod activation_service;
mod approval_service;
mod authorization_service;
mod email_dispatcher;
mod email_ports;
mod invitation_ports;
mod invitation_service;
mod links;
mod retailer_ports;
mod token_service;

#[cfg(test)]
mod test_support;

pub use activation_service::{ActivationService, IssuedActivationToken};
pub use approval_service::{RetailerApprovalService, ReviewAction, ReviewOutcome};
pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use email_dispatcher::{
    ApprovedEmail, ColdOutreachEmail, DispatchOutcome, EmailDispatcher, EmailTemplate,
    FALLBACK_BUSINESS_NAME, FALLBACK_CONTACT_NAME, FALLBACK_REJECTION_REASON,
    MAX_DISPATCH_TIMEOUT, RejectedEmail, RenderedEmail,
};
pub use email_ports::{EmailDispatchRepository, EmailProvider, OutboundEmail, ProviderReceipt};
pub use invitation_ports::{InvitationRepository, NewInvitation};
pub use invitation_service::{
    CREATED_VIA_ADMIN_BATCH, CREATED_VIA_KEY, ClickResolution, CreatedInvitation,
    InvitationBatchOutcome, InvitationEntryError, InvitationRequest, InvitationService,
    TrackingOutcome,
};
pub use links::PublicLinks;
pub use retailer_ports::{
    ActivationRedemption, ActivationTokenRepository, NewActivationToken, RetailerRepository,
};
pub use token_service::{InvitationTokenSet, TOKEN_BYTES, TokenService, hash_token};
