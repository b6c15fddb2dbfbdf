use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use retailhub_core::AppError;
use retailhub_domain::{EmailAddress, Invitation, InvitationId, InvitationStatus};

use super::{
    CREATED_VIA_ADMIN_BATCH, CREATED_VIA_KEY, InvitationEntryError, InvitationRequest,
    InvitationService, TrackingOutcome,
};
use crate::email_dispatcher::EmailDispatcher;
use crate::links::PublicLinks;
use crate::test_support::{
    FakeEmailProvider, FakeInvitationRepository, admin, authorization, outsider,
};
use crate::token_service::TokenService;

struct Harness {
    service: InvitationService,
    repository: Arc<FakeInvitationRepository>,
    provider: Arc<FakeEmailProvider>,
}

fn harness_with(repository: FakeInvitationRepository, provider: FakeEmailProvider) -> Harness {
    let repository = Arc::new(repository);
    let provider = Arc::new(provider);
    let links = PublicLinks::new("http://localhost:3000", "http://localhost:3001")
        .unwrap_or_else(|_| unreachable!());

    Harness {
        service: InvitationService::new(
            authorization(),
            repository.clone(),
            TokenService::new(),
            EmailDispatcher::new(provider.clone(), Duration::from_secs(5)),
            links,
        ),
        repository,
        provider,
    }
}

fn harness() -> Harness {
    harness_with(
        FakeInvitationRepository::default(),
        FakeEmailProvider::accepting(),
    )
}

fn request(email: &str) -> InvitationRequest {
    InvitationRequest {
        email: Some(email.to_owned()),
        business_name: Some("Bakkerij Jansen".to_owned()),
        contact_name: Some("Piet".to_owned()),
        ..InvitationRequest::default()
    }
}

fn invitation_at(status: InvitationStatus) -> Invitation {
    Invitation {
        id: InvitationId::new(),
        email: EmailAddress::new("piet@jansen.nl").unwrap_or_else(|_| unreachable!()),
        business_name: None,
        contact_name: None,
        phone: None,
        status,
        invitation_token: "invite-token".to_owned(),
        tracking_pixel_id: "pixel-1".to_owned(),
        click_tracking_id: "click-1".to_owned(),
        invited_by: "admin-1".to_owned(),
        email_sent_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        metadata: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn batch_reports_missing_and_duplicate_entries_in_order() {
    let harness = harness();

    let outcome = harness
        .service
        .create_invitations(
            &admin(),
            vec![request("a@x.nl"), request(""), request("a@x.nl")],
            true,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let (created, errors) = outcome.into_parts();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].invitation.email.as_str(), "a@x.nl");
    assert_eq!(
        errors,
        vec![
            InvitationEntryError::new("", "email required"),
            InvitationEntryError::new("a@x.nl", "duplicate pending invitation"),
        ]
    );
    assert_eq!(harness.repository.all().len(), 1);
}

#[tokio::test]
async fn sequential_batches_cannot_duplicate_an_open_invitation() {
    let harness = harness();

    let first = harness
        .service
        .create_invitations(&admin(), vec![request("Piet@Jansen.nl")], false)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(first.created().count(), 1);

    let second = harness
        .service
        .create_invitations(&admin(), vec![request(" piet@jansen.nl ")], false)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(second.created().count(), 0);
    assert_eq!(
        second.errors().map(|error| error.reason.as_str()).collect::<Vec<_>>(),
        vec!["duplicate pending invitation"]
    );
}

#[tokio::test]
async fn malformed_email_is_an_entry_error() {
    let harness = harness();

    let outcome = harness
        .service
        .create_invitations(
            &admin(),
            vec![request("not-an-email"), InvitationRequest::default()],
            false,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let reasons: Vec<_> = outcome.errors().map(|error| error.reason.clone()).collect();
    assert_eq!(reasons, vec!["invalid email address", "email required"]);
}

#[tokio::test]
async fn blank_email_is_reported_as_empty() {
    let harness = harness();

    let outcome = harness
        .service
        .create_invitations(&admin(), vec![request("   ")], false)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        outcome.errors().cloned().collect::<Vec<_>>(),
        vec![InvitationEntryError::new("", "email required")]
    );
    assert!(harness.repository.all().is_empty());
}

#[tokio::test]
async fn created_invitation_carries_distinct_tokens_and_provenance() {
    let harness = harness();

    let outcome = harness
        .service
        .create_invitations(&admin(), vec![request("piet@jansen.nl")], false)
        .await
        .unwrap_or_else(|_| unreachable!());

    let created = outcome.created().next().map(|entry| entry.invitation.clone());
    let Some(invitation) = created else {
        unreachable!()
    };
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invited_by, "admin-1");
    assert_ne!(invitation.invitation_token, invitation.tracking_pixel_id);
    assert_ne!(invitation.tracking_pixel_id, invitation.click_tracking_id);
    assert_eq!(
        invitation.metadata.get(CREATED_VIA_KEY),
        Some(&serde_json::Value::from(CREATED_VIA_ADMIN_BATCH))
    );
    assert!(harness.provider.sent().is_empty());
}

#[tokio::test]
async fn sent_email_embeds_tracking_links_and_stamps_sent_at() {
    let harness = harness();

    let outcome = harness
        .service
        .create_invitations(&admin(), vec![request("piet@jansen.nl")], true)
        .await
        .unwrap_or_else(|_| unreachable!());

    let Some(created) = outcome.created().next() else {
        unreachable!()
    };
    assert_eq!(created.invitation.status, InvitationStatus::Sent);
    assert!(created.invitation.email_sent_at.is_some());
    assert!(!created.has_email_warning());

    let sent = harness.provider.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html_body.contains(&format!(
        "/invitations/track/pixel?id={}",
        created.invitation.tracking_pixel_id
    )));
    assert!(sent[0].text_body.contains(&format!(
        "/invitations/track/click?id={}",
        created.invitation.click_tracking_id
    )));
}

#[tokio::test]
async fn email_failure_is_a_warning_on_a_created_invitation() {
    let harness = harness_with(
        FakeInvitationRepository::default(),
        FakeEmailProvider::failing("smtp unreachable"),
    );

    let outcome = harness
        .service
        .create_invitations(&admin(), vec![request("piet@jansen.nl")], true)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.errors().count(), 0);
    let Some(created) = outcome.created().next() else {
        unreachable!()
    };
    assert!(created.has_email_warning());
    assert_eq!(created.invitation.status, InvitationStatus::Sent);
    assert!(created.invitation.email_sent_at.is_none());
}

#[tokio::test]
async fn storage_failure_on_one_entry_does_not_abort_the_batch() {
    let harness = harness_with(
        FakeInvitationRepository::failing_for("kapot@x.nl"),
        FakeEmailProvider::accepting(),
    );

    let outcome = harness
        .service
        .create_invitations(
            &admin(),
            vec![request("kapot@x.nl"), request("heel@x.nl")],
            false,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.created().count(), 1);
    let errors: Vec<_> = outcome.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].email, "kapot@x.nl");
    assert!(errors[0].reason.starts_with("failed to store invitation"));
}

#[tokio::test]
async fn non_admin_cannot_create_or_list_invitations() {
    let harness = harness();

    let created = harness
        .service
        .create_invitations(&outsider(), vec![request("piet@jansen.nl")], true)
        .await;
    assert!(matches!(created, Err(AppError::Unauthorized(_))));
    assert!(harness.repository.all().is_empty());
    assert!(harness.provider.sent().is_empty());

    let listed = harness.service.list_invitations(&outsider(), None).await;
    assert!(matches!(listed, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn list_filters_by_status() {
    let harness = harness();
    harness.repository.insert(invitation_at(InvitationStatus::Sent));
    harness.repository.insert(invitation_at(InvitationStatus::Clicked));

    let clicked = harness
        .service
        .list_invitations(&admin(), Some(InvitationStatus::Clicked))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(clicked.len(), 1);
    assert_eq!(clicked[0].status, InvitationStatus::Clicked);

    let all = harness
        .service
        .list_invitations(&admin(), None)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn open_then_click_escalates_monotonically() {
    let harness = harness();
    let invitation = invitation_at(InvitationStatus::Sent);
    let id = invitation.id;
    harness.repository.insert(invitation);

    let opened = harness.service.record_open("pixel-1").await;
    assert_eq!(
        opened.ok(),
        Some(TrackingOutcome::Escalated(InvitationStatus::Opened))
    );

    let clicked = harness.service.record_click("click-1").await;
    assert!(clicked.as_ref().is_ok_and(|resolution| {
        resolution.outcome == TrackingOutcome::Escalated(InvitationStatus::Clicked)
            && resolution.destination == "http://localhost:3000/register?invitation=invite-token"
    }));
    assert_eq!(harness.repository.status_of(id), Some(InvitationStatus::Clicked));
}

#[tokio::test]
async fn late_open_never_downgrades_a_click() {
    let harness = harness();
    let invitation = invitation_at(InvitationStatus::Sent);
    let id = invitation.id;
    harness.repository.insert(invitation);

    let clicked = harness.service.record_click("click-1").await;
    assert!(clicked.is_ok());
    let opened = harness.service.record_open("pixel-1").await;

    assert_eq!(opened.ok(), Some(TrackingOutcome::Unchanged));
    assert_eq!(harness.repository.status_of(id), Some(InvitationStatus::Clicked));
}

#[tokio::test]
async fn unknown_tracking_ids_are_harmless() {
    let harness = harness();

    assert_eq!(
        harness.service.record_open("nope").await.ok(),
        Some(TrackingOutcome::Unknown)
    );
    assert_eq!(
        harness.service.record_open("").await.ok(),
        Some(TrackingOutcome::Unknown)
    );

    let click = harness.service.record_click("nope").await;
    assert!(click.is_ok_and(|resolution| {
        resolution.outcome == TrackingOutcome::Unknown
            && resolution.destination == "http://localhost:3000/"
    }));
}

#[tokio::test]
async fn pending_invitation_does_not_record_opens() {
    let harness = harness();
    let invitation = invitation_at(InvitationStatus::Pending);
    let id = invitation.id;
    harness.repository.insert(invitation);

    assert_eq!(
        harness.service.record_open("pixel-1").await.ok(),
        Some(TrackingOutcome::Unchanged)
    );
    assert_eq!(harness.repository.status_of(id), Some(InvitationStatus::Pending));
}

#[tokio::test]
async fn expiry_sweep_only_touches_old_unresolved_invitations() {
    let harness = harness();
    let mut stale = invitation_at(InvitationStatus::Opened);
    stale.created_at = Utc::now() - chrono::Duration::days(45);
    let stale_id = stale.id;
    let mut registered = invitation_at(InvitationStatus::Registered);
    registered.created_at = Utc::now() - chrono::Duration::days(45);
    let registered_id = registered.id;
    let fresh = invitation_at(InvitationStatus::Sent);
    let fresh_id = fresh.id;
    harness.repository.insert(stale);
    harness.repository.insert(registered);
    harness.repository.insert(fresh);

    let expired = harness
        .service
        .expire_stale_invitations(chrono::Duration::days(30))
        .await;

    assert_eq!(expired.ok(), Some(1));
    assert_eq!(
        harness.repository.status_of(stale_id),
        Some(InvitationStatus::Expired)
    );
    assert_eq!(
        harness.repository.status_of(registered_id),
        Some(InvitationStatus::Registered)
    );
    assert_eq!(harness.repository.status_of(fresh_id), Some(InvitationStatus::Sent));
    assert!(matches!(
        harness
            .service
            .expire_stale_invitations(chrono::Duration::zero())
            .await,
        Err(AppError::Validation(_))
    ));
}
