//! In-process fakes shared by the service tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retailhub_core::{AppError, AppResult, UserIdentity};
use retailhub_domain::{
    ActivationToken, ActivationTokenId, ActorRole, EmailDispatchRecord, Invitation, InvitationId,
    InvitationStatus, RetailerAccount, RetailerId, RetailerStatus,
};

use crate::authorization_service::{AuthorizationRepository, AuthorizationService};
use crate::email_ports::{EmailDispatchRepository, EmailProvider, OutboundEmail, ProviderReceipt};
use crate::invitation_ports::{InvitationRepository, NewInvitation};
use crate::retailer_ports::{
    ActivationRedemption, ActivationTokenRepository, NewActivationToken, RetailerRepository,
};

pub const ADMIN_SUBJECT: &str = "admin-1";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn admin() -> UserIdentity {
    UserIdentity::new(ADMIN_SUBJECT, "Admin", Some("admin@retailhub.nl".to_owned()))
}

pub fn outsider() -> UserIdentity {
    UserIdentity::new("shop-42", "Shop", None)
}

pub fn authorization() -> AuthorizationService {
    AuthorizationService::new(Arc::new(FakeAuthorizationRepository::with_role(
        ADMIN_SUBJECT,
        ActorRole::Admin,
    )))
}

pub fn retailer(email: &str, status: RetailerStatus) -> RetailerAccount {
    RetailerAccount {
        id: RetailerId::new(),
        business_name: "Bloemenhuis De Tulp".to_owned(),
        contact_name: "Anke de Vries".to_owned(),
        email: email.to_owned(),
        phone: None,
        address: Some("Markt 1, Utrecht".to_owned()),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct FakeAuthorizationRepository {
    roles: HashMap<String, ActorRole>,
}

impl FakeAuthorizationRepository {
    pub fn with_role(subject: &str, role: ActorRole) -> Self {
        Self {
            roles: HashMap::from([(subject.to_owned(), role)]),
        }
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_role(&self, subject: &str) -> AppResult<Option<ActorRole>> {
        Ok(self.roles.get(subject).copied())
    }
}

enum ProviderMode {
    Accept,
    Fail(String),
    Hang,
}

pub struct FakeEmailProvider {
    mode: ProviderMode,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl FakeEmailProvider {
    pub fn accepting() -> Self {
        Self::with_mode(ProviderMode::Accept)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_mode(ProviderMode::Fail(message.to_owned()))
    }

    pub fn hanging() -> Self {
        Self::with_mode(ProviderMode::Hang)
    }

    fn with_mode(mode: ProviderMode) -> Self {
        Self {
            mode,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailProvider for FakeEmailProvider {
    async fn send_email(&self, email: &OutboundEmail) -> AppResult<ProviderReceipt> {
        match &self.mode {
            ProviderMode::Accept => {
                let mut sent = lock(&self.sent);
                sent.push(email.clone());
                Ok(ProviderReceipt {
                    provider_reference: Some(format!("msg-{}", sent.len())),
                })
            }
            ProviderMode::Fail(message) => Err(AppError::Dependency(message.clone())),
            ProviderMode::Hang => {
                std::future::pending::<()>().await;
                Ok(ProviderReceipt::default())
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingDispatchLog {
    records: Mutex<Vec<EmailDispatchRecord>>,
}

impl RecordingDispatchLog {
    pub fn records(&self) -> Vec<EmailDispatchRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl EmailDispatchRepository for RecordingDispatchLog {
    async fn record_dispatch(&self, record: &EmailDispatchRecord) -> AppResult<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeInvitationRepository {
    invitations: Mutex<Vec<Invitation>>,
    failing_email: Option<String>,
}

impl FakeInvitationRepository {
    /// Fails inserts for `email` as if the datastore were unavailable.
    pub fn failing_for(email: &str) -> Self {
        Self {
            invitations: Mutex::new(Vec::new()),
            failing_email: Some(email.to_owned()),
        }
    }

    pub fn all(&self) -> Vec<Invitation> {
        lock(&self.invitations).clone()
    }

    pub fn insert(&self, invitation: Invitation) {
        lock(&self.invitations).push(invitation);
    }

    pub fn status_of(&self, invitation_id: InvitationId) -> Option<InvitationStatus> {
        lock(&self.invitations)
            .iter()
            .find(|invitation| invitation.id == invitation_id)
            .map(|invitation| invitation.status)
    }
}

#[async_trait]
impl InvitationRepository for FakeInvitationRepository {
    async fn list_invitations(
        &self,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<Invitation>> {
        let mut invitations: Vec<Invitation> = lock(&self.invitations)
            .iter()
            .filter(|invitation| status.is_none_or(|status| invitation.status == status))
            .cloned()
            .collect();
        invitations.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(invitations)
    }

    async fn create_invitation(&self, invitation: NewInvitation) -> AppResult<Invitation> {
        if self.failing_email.as_deref() == Some(invitation.email.as_str()) {
            return Err(AppError::Dependency(
                "failed to insert invitation: connection reset".to_owned(),
            ));
        }

        let mut invitations = lock(&self.invitations);
        if invitations.iter().any(|existing| {
            existing.email == invitation.email && existing.status.is_unresolved()
        }) {
            return Err(AppError::Conflict(format!(
                "an open invitation already exists for '{}'",
                invitation.email
            )));
        }

        let now = Utc::now();
        let created = Invitation {
            id: InvitationId::new(),
            email: invitation.email,
            business_name: invitation.business_name,
            contact_name: invitation.contact_name,
            phone: invitation.phone,
            status: InvitationStatus::Pending,
            invitation_token: invitation.invitation_token,
            tracking_pixel_id: invitation.tracking_pixel_id,
            click_tracking_id: invitation.click_tracking_id,
            invited_by: invitation.invited_by,
            email_sent_at: None,
            created_at: now,
            updated_at: now,
            metadata: invitation.metadata,
        };
        invitations.push(created.clone());
        Ok(created)
    }

    async fn find_by_tracking_pixel_id(
        &self,
        tracking_pixel_id: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(lock(&self.invitations)
            .iter()
            .find(|invitation| invitation.tracking_pixel_id == tracking_pixel_id)
            .cloned())
    }

    async fn find_by_click_tracking_id(
        &self,
        click_tracking_id: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(lock(&self.invitations)
            .iter()
            .find(|invitation| invitation.click_tracking_id == click_tracking_id)
            .cloned())
    }

    async fn mark_sent(
        &self,
        invitation_id: InvitationId,
        email_sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Invitation>> {
        let mut invitations = lock(&self.invitations);
        let Some(invitation) = invitations.iter_mut().find(|invitation| {
            invitation.id == invitation_id && invitation.status == InvitationStatus::Pending
        }) else {
            return Ok(None);
        };

        invitation.status = InvitationStatus::Sent;
        invitation.email_sent_at = email_sent_at;
        invitation.updated_at = Utc::now();
        Ok(Some(invitation.clone()))
    }

    async fn advance_status(
        &self,
        invitation_id: InvitationId,
        target: InvitationStatus,
    ) -> AppResult<bool> {
        let sources = InvitationStatus::escalation_sources(target);
        let mut invitations = lock(&self.invitations);
        let Some(invitation) = invitations.iter_mut().find(|invitation| {
            invitation.id == invitation_id && sources.contains(&invitation.status)
        }) else {
            return Ok(false);
        };

        invitation.status = target;
        invitation.updated_at = Utc::now();
        Ok(true)
    }

    async fn expire_unresolved_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut expired = 0;
        for invitation in lock(&self.invitations).iter_mut() {
            if invitation.status.is_unresolved() && invitation.created_at < cutoff {
                invitation.status = InvitationStatus::Expired;
                invitation.updated_at = Utc::now();
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[derive(Default)]
pub struct FakeRetailerRepository {
    retailers: Mutex<HashMap<RetailerId, RetailerAccount>>,
    writes: AtomicUsize,
    write_failures: Mutex<VecDeque<AppError>>,
}

impl FakeRetailerRepository {
    pub fn with(account: RetailerAccount) -> Self {
        Self {
            retailers: Mutex::new(HashMap::from([(account.id, account)])),
            ..Self::default()
        }
    }

    /// Makes the next status write fail with `error` without changing state.
    pub fn fail_next_write(&self, error: AppError) {
        lock(&self.write_failures).push_back(error);
    }

    pub async fn status_of(&self, retailer_id: RetailerId) -> Option<RetailerStatus> {
        lock(&self.retailers)
            .get(&retailer_id)
            .map(|account| account.status)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn apply_transition(
        &self,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<Result<RetailerAccount, Option<RetailerStatus>>> {
        if let Some(error) = lock(&self.write_failures).pop_front() {
            return Err(error);
        }

        let mut retailers = lock(&self.retailers);
        let Some(account) = retailers.get_mut(&retailer_id) else {
            return Ok(Err(None));
        };
        if !account.status.can_transition_to(target) {
            return Ok(Err(Some(account.status)));
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        account.status = target;
        account.updated_at = Utc::now();
        Ok(Ok(account.clone()))
    }
}

#[async_trait]
impl RetailerRepository for FakeRetailerRepository {
    async fn find_retailer(&self, retailer_id: RetailerId) -> AppResult<Option<RetailerAccount>> {
        Ok(lock(&self.retailers).get(&retailer_id).cloned())
    }

    async fn transition_status(
        &self,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<Option<RetailerAccount>> {
        Ok(self.apply_transition(retailer_id, target)?.ok())
    }
}

/// Token fake sharing the retailer fake so activation can write both atomically.
pub struct FakeActivationTokenRepository {
    tokens: Mutex<Vec<ActivationToken>>,
    retailers: Arc<FakeRetailerRepository>,
}

impl FakeActivationTokenRepository {
    pub fn new(retailers: Arc<FakeRetailerRepository>) -> Self {
        Self {
            tokens: Mutex::new(Vec::new()),
            retailers,
        }
    }

    pub async fn open_tokens_for(&self, retailer_id: RetailerId) -> usize {
        let now = Utc::now();
        lock(&self.tokens)
            .iter()
            .filter(|token| token.retailer_id == retailer_id && token.is_redeemable(now))
            .count()
    }

    pub async fn force_expiry(&self, token_hash: &str, expires_at: DateTime<Utc>) {
        if let Some(token) = lock(&self.tokens)
            .iter_mut()
            .find(|token| token.token_hash == token_hash)
        {
            token.expires_at = expires_at;
        }
    }
}

#[async_trait]
impl ActivationTokenRepository for FakeActivationTokenRepository {
    async fn issue_token(&self, token: NewActivationToken) -> AppResult<ActivationToken> {
        let mut tokens = lock(&self.tokens);
        for existing in tokens.iter_mut().filter(|existing| {
            existing.retailer_id == token.retailer_id
                && existing.redeemed_at.is_none()
                && existing.superseded_at.is_none()
        }) {
            existing.superseded_at = Some(token.issued_at);
        }

        let issued = ActivationToken {
            id: ActivationTokenId::new(),
            retailer_id: token.retailer_id,
            token_hash: token.token_hash,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            redeemed_at: None,
            superseded_at: None,
        };
        tokens.push(issued.clone());
        Ok(issued)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<ActivationToken>> {
        Ok(lock(&self.tokens)
            .iter()
            .find(|token| token.token_hash == token_hash)
            .cloned())
    }

    async fn redeem_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>> {
        let mut tokens = lock(&self.tokens);
        let Some(token) = tokens
            .iter_mut()
            .find(|token| token.token_hash == token_hash && token.is_redeemable(now))
        else {
            return Ok(None);
        };

        token.redeemed_at = Some(now);
        Ok(Some(token.clone()))
    }

    async fn redeem_and_activate(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ActivationRedemption> {
        let mut tokens = lock(&self.tokens);
        let Some(token) = tokens
            .iter_mut()
            .find(|token| token.token_hash == token_hash && token.is_redeemable(now))
        else {
            return Ok(ActivationRedemption::TokenUnavailable);
        };

        match self
            .retailers
            .apply_transition(token.retailer_id, RetailerStatus::Active)?
        {
            Ok(retailer) => {
                token.redeemed_at = Some(now);
                Ok(ActivationRedemption::Activated(retailer))
            }
            Err(status) => Ok(ActivationRedemption::NotAwaitingActivation {
                retailer_id: token.retailer_id,
                status,
            }),
        }
    }
}
