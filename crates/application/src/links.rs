use retailhub_core::{AppError, AppResult};
use url::Url;

/// Builds the public URLs embedded in outbound email.
#[derive(Debug, Clone)]
pub struct PublicLinks {
    frontend_url: Url,
    api_url: Url,
}

impl PublicLinks {
    /// Creates a link builder from the frontend and public API base URLs.
    pub fn new(frontend_url: &str, api_url: &str) -> AppResult<Self> {
        Ok(Self {
            frontend_url: parse_base("frontend", frontend_url)?,
            api_url: parse_base("api", api_url)?,
        })
    }

    /// Landing page used when a tracked link cannot be resolved.
    #[must_use]
    pub fn landing_url(&self) -> String {
        self.frontend_url.to_string()
    }

    /// Registration page carrying the invitation redemption secret.
    #[must_use]
    pub fn registration_url(&self, invitation_token: &str) -> String {
        build(
            &self.frontend_url,
            &["register"],
            &[("invitation", invitation_token)],
        )
    }

    /// Open-tracking pixel URL.
    #[must_use]
    pub fn pixel_url(&self, tracking_pixel_id: &str) -> String {
        build(
            &self.api_url,
            &["invitations", "track", "pixel"],
            &[("id", tracking_pixel_id)],
        )
    }

    /// Click-tracking URL that redirects to the registration page.
    #[must_use]
    pub fn click_url(&self, click_tracking_id: &str) -> String {
        build(
            &self.api_url,
            &["invitations", "track", "click"],
            &[("id", click_tracking_id)],
        )
    }

    /// Activation page for an approved retailer.
    #[must_use]
    pub fn activation_url(&self, activation_token: &str) -> String {
        build(&self.frontend_url, &["activate", activation_token], &[])
    }
}

fn parse_base(label: &str, value: &str) -> AppResult<Url> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid {label} url '{value}': {error}")))?;

    if url.cannot_be_a_base() {
        return Err(AppError::Validation(format!(
            "{label} url '{value}' cannot be used as a base"
        )));
    }

    Ok(url)
}

fn build(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> String {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    url.to_string()
}
