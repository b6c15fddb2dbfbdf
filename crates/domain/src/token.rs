use serde::{Deserialize, Serialize};

/// Purposes opaque tokens are minted for. Tokens carry no purpose marker; the
/// purpose only selects which column or table the value lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Invitation redemption secret.
    Invitation,
    /// Open-tracking pixel identifier.
    Pixel,
    /// Click-tracking identifier.
    Click,
    /// Activation redemption secret.
    Activation,
}

impl TokenPurpose {
    /// Returns a stable label for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invitation => "invitation",
            Self::Pixel => "pixel",
            Self::Click => "click",
            Self::Activation => "activation",
        }
    }
}
