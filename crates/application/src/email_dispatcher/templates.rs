use chrono::{DateTime, Utc};
use retailhub_domain::EmailTemplateKind;

/// Greeting used when no contact name is known.
pub const FALLBACK_CONTACT_NAME: &str = "ondernemer";
/// Business label used when no business name is known.
pub const FALLBACK_BUSINESS_NAME: &str = "uw onderneming";
/// Reason quoted in a rejection email when the admin gave none.
pub const FALLBACK_REJECTION_REASON: &str =
    "Uw aanvraag voldoet op dit moment niet aan onze criteria.";

/// Variables for the outreach invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColdOutreachEmail {
    /// Prospect business name.
    pub business_name: Option<String>,
    /// Prospect contact person.
    pub contact_name: Option<String>,
    /// Tracked link to the registration page.
    pub click_url: String,
    /// Open-tracking pixel URL.
    pub pixel_url: String,
}

/// Variables for the approval notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedEmail {
    /// Retailer business name.
    pub business_name: Option<String>,
    /// Retailer contact person.
    pub contact_name: Option<String>,
    /// Link that redeems the activation token.
    pub activation_url: String,
    /// Activation token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Variables for the rejection notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEmail {
    /// Retailer business name.
    pub business_name: Option<String>,
    /// Retailer contact person.
    pub contact_name: Option<String>,
    /// Admin-supplied reason.
    pub reason: Option<String>,
}

/// A template together with its typed variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Outreach invitation.
    ColdOutreach(ColdOutreachEmail),
    /// Approval notification.
    Approved(ApprovedEmail),
    /// Rejection notification.
    Rejected(RejectedEmail),
}

/// Rendered subject and bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Plain-text body.
    pub text_body: String,
}

impl EmailTemplate {
    /// Returns the template family.
    #[must_use]
    pub fn kind(&self) -> EmailTemplateKind {
        match self {
            Self::ColdOutreach(_) => EmailTemplateKind::ColdOutreach,
            Self::Approved(_) => EmailTemplateKind::Approved,
            Self::Rejected(_) => EmailTemplateKind::Rejected,
        }
    }

    /// Renders subject, HTML and plain-text bodies.
    #[must_use]
    pub fn render(&self) -> RenderedEmail {
        match self {
            Self::ColdOutreach(variables) => render_cold_outreach(variables),
            Self::Approved(variables) => render_approved(variables),
            Self::Rejected(variables) => render_rejected(variables),
        }
    }
}

fn render_cold_outreach(variables: &ColdOutreachEmail) -> RenderedEmail {
    let contact = or_fallback(variables.contact_name.as_deref(), FALLBACK_CONTACT_NAME);
    let business = or_fallback(variables.business_name.as_deref(), FALLBACK_BUSINESS_NAME);

    let subject = format!("Uitnodiging: verkoop via RetailHub met {business}");
    let text_body = format!(
        "Beste {contact},\n\n\
         Wij nodigen {business} graag uit om retailpartner van RetailHub te worden.\n\n\
         Meld u aan via de onderstaande link:\n{}\n\n\
         Met vriendelijke groet,\nHet RetailHub team",
        variables.click_url
    );
    let html_body = format!(
        "<p>Beste {contact},</p>\
         <p>Wij nodigen <strong>{business}</strong> graag uit om retailpartner van RetailHub te worden.</p>\
         <p><a href=\"{click_url}\">Aanmelden als retailer</a></p>\
         <p>Met vriendelijke groet,<br>Het RetailHub team</p>\
         <img src=\"{pixel_url}\" width=\"1\" height=\"1\" alt=\"\" style=\"display:none\">",
        contact = escape_html(contact),
        business = escape_html(business),
        click_url = escape_html(variables.click_url.as_str()),
        pixel_url = escape_html(variables.pixel_url.as_str()),
    );

    RenderedEmail {
        subject,
        html_body,
        text_body,
    }
}

fn render_approved(variables: &ApprovedEmail) -> RenderedEmail {
    let contact = or_fallback(variables.contact_name.as_deref(), FALLBACK_CONTACT_NAME);
    let business = or_fallback(variables.business_name.as_deref(), FALLBACK_BUSINESS_NAME);
    let expires_on = variables.expires_at.format("%d-%m-%Y").to_string();

    let subject = format!("Uw RetailHub account voor {business} is goedgekeurd");
    let text_body = format!(
        "Beste {contact},\n\n\
         Goed nieuws: de aanmelding van {business} is goedgekeurd.\n\n\
         Activeer uw account via de onderstaande link:\n{}\n\n\
         Deze link is geldig tot en met {expires_on} en kan één keer gebruikt worden.\n\n\
         Met vriendelijke groet,\nHet RetailHub team",
        variables.activation_url
    );
    let html_body = format!(
        "<p>Beste {contact},</p>\
         <p>Goed nieuws: de aanmelding van <strong>{business}</strong> is goedgekeurd.</p>\
         <p><a href=\"{activation_url}\">Account activeren</a></p>\
         <p>Deze link is geldig tot en met {expires_on} en kan één keer gebruikt worden.</p>\
         <p>Met vriendelijke groet,<br>Het RetailHub team</p>",
        contact = escape_html(contact),
        business = escape_html(business),
        activation_url = escape_html(variables.activation_url.as_str()),
    );

    RenderedEmail {
        subject,
        html_body,
        text_body,
    }
}

fn render_rejected(variables: &RejectedEmail) -> RenderedEmail {
    let contact = or_fallback(variables.contact_name.as_deref(), FALLBACK_CONTACT_NAME);
    let business = or_fallback(variables.business_name.as_deref(), FALLBACK_BUSINESS_NAME);
    let reason = or_fallback(variables.reason.as_deref(), FALLBACK_REJECTION_REASON);

    let subject = format!("Update over de aanmelding van {business}");
    let text_body = format!(
        "Beste {contact},\n\n\
         Helaas kunnen wij de aanmelding van {business} niet goedkeuren.\n\n\
         Reden: {reason}\n\n\
         Met vriendelijke groet,\nHet RetailHub team"
    );
    let html_body = format!(
        "<p>Beste {contact},</p>\
         <p>Helaas kunnen wij de aanmelding van <strong>{business}</strong> niet goedkeuren.</p>\
         <p>Reden: {reason}</p>\
         <p>Met vriendelijke groet,<br>Het RetailHub team</p>",
        contact = escape_html(contact),
        business = escape_html(business),
        reason = escape_html(reason),
    );

    RenderedEmail {
        subject,
        html_body,
        text_body,
    }
}

fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
}

pub(super) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
