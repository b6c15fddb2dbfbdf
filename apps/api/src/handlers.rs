pub mod activation;
pub mod health;
pub mod invitations;
pub mod retailers;
pub mod tracking;
