//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod activation;
mod email;
mod invitation;
mod retailer;
mod token;
mod user;

pub use activation::{ActivationToken, ActivationTokenId, DEFAULT_ACTIVATION_TOKEN_TTL_DAYS};
pub use email::{EmailDispatchRecord, EmailTemplateKind};
pub use invitation::{Invitation, InvitationId, InvitationStatus};
pub use retailer::{RetailerAccount, RetailerId, RetailerStatus};
pub use token::TokenPurpose;
pub use user::{ActorRole, EmailAddress};
