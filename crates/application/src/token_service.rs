//! Opaque token minting.
//!
//! Tokens are 256 bits from the operating system CSPRNG, encoded as lowercase
//! hex. They carry no structure, so the same generator serves every purpose.

use retailhub_core::{AppError, AppResult};
use retailhub_domain::TokenPurpose;
use sha2::{Digest, Sha256};

/// Number of random bytes behind every token.
pub const TOKEN_BYTES: usize = 32;

/// Three independent secrets minted for one invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationTokenSet {
    /// Registration redemption secret.
    pub invitation_token: String,
    /// Open-tracking identifier.
    pub tracking_pixel_id: String,
    /// Click-tracking identifier.
    pub click_tracking_id: String,
}

/// Stateless token generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenService;

impl TokenService {
    /// Creates a token service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Issues a fresh token for `purpose`.
    ///
    /// Fails only when the entropy source is unavailable, which is reported as
    /// an internal error rather than a business outcome.
    pub fn issue(&self, purpose: TokenPurpose) -> AppResult<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!(
                "failed to generate {} token: {error}",
                purpose.as_str()
            ))
        })?;

        Ok(hex::encode(bytes))
    }

    /// Issues the redemption, pixel and click tokens for one invitation.
    pub fn issue_invitation_set(&self) -> AppResult<InvitationTokenSet> {
        Ok(InvitationTokenSet {
            invitation_token: self.issue(TokenPurpose::Invitation)?,
            tracking_pixel_id: self.issue(TokenPurpose::Pixel)?,
            click_tracking_id: self.issue(TokenPurpose::Click)?,
        })
    }
}

/// Computes the SHA-256 hash of a token string for storage.
#[must_use]
pub fn hash_token(raw_token: &str) -> String {
    hex::encode(Sha256::digest(raw_token.as_bytes()))
}
