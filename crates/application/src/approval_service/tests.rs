use std::sync::Arc;
use std::time::Duration;

use retailhub_core::AppError;
use retailhub_domain::{EmailTemplateKind, RetailerAccount, RetailerId, RetailerStatus};

use super::{RetailerApprovalService, ReviewAction};
use crate::activation_service::ActivationService;
use crate::email_dispatcher::{EmailDispatcher, FALLBACK_REJECTION_REASON};
use crate::links::PublicLinks;
use crate::test_support::{
    FakeActivationTokenRepository, FakeEmailProvider, FakeRetailerRepository, admin,
    authorization, outsider, retailer,
};
use crate::token_service::TokenService;

struct Harness {
    service: RetailerApprovalService,
    activation: ActivationService,
    retailers: Arc<FakeRetailerRepository>,
    tokens: Arc<FakeActivationTokenRepository>,
    provider: Arc<FakeEmailProvider>,
    account: RetailerAccount,
}

fn harness(account: RetailerAccount, provider: FakeEmailProvider) -> Harness {
    let retailers = Arc::new(FakeRetailerRepository::with(account.clone()));
    let tokens = Arc::new(FakeActivationTokenRepository::new(retailers.clone()));
    let provider = Arc::new(provider);
    let activation = ActivationService::new(tokens.clone(), TokenService::new());
    let links = PublicLinks::new("http://localhost:3000", "http://localhost:3001")
        .unwrap_or_else(|_| unreachable!());

    Harness {
        service: RetailerApprovalService::new(
            authorization(),
            retailers.clone(),
            activation.clone(),
            EmailDispatcher::new(provider.clone(), Duration::from_secs(5)),
            links,
        ),
        activation,
        retailers,
        tokens,
        provider,
        account,
    }
}

fn pending(email: &str) -> RetailerAccount {
    retailer(email, RetailerStatus::Pending)
}

fn activation_token_from(body: &str) -> Option<String> {
    let start = body.find("/activate/")? + "/activate/".len();
    Some(
        body[start..]
            .chars()
            .take_while(char::is_ascii_hexdigit)
            .collect(),
    )
}

#[tokio::test]
async fn approve_writes_status_issues_token_and_emails_link() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());

    let outcome = harness
        .service
        .approve(&admin(), harness.account.id)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.retailer.status, RetailerStatus::Approved);
    assert!(outcome.email.succeeded);
    assert_eq!(outcome.email.template_kind, EmailTemplateKind::Approved);
    assert!(outcome.activation_expires_at.is_some());
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 1);

    let sent = harness.provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "info@detulp.nl");
    let token = activation_token_from(&sent[0].text_body);
    assert!(token.as_ref().is_some_and(|token| token.len() == 64));
}

#[tokio::test]
async fn approved_link_activates_the_retailer_once() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());
    let approved = harness.service.approve(&admin(), harness.account.id).await;
    assert!(approved.is_ok());

    let sent = harness.provider.sent();
    let Some(token) = activation_token_from(&sent[0].text_body) else {
        unreachable!()
    };

    let (left, right) = tokio::join!(
        harness.activation.redeem(&token),
        harness.activation.redeem(&token)
    );
    assert_eq!([&left, &right].iter().filter(|result| result.is_ok()).count(), 1);
    assert!(
        matches!(left, Err(AppError::Conflict(_))) || matches!(right, Err(AppError::Conflict(_)))
    );
}

#[tokio::test]
async fn missing_email_fails_before_any_mutation() {
    let harness = harness(pending("   "), FakeEmailProvider::accepting());

    let result = harness.service.approve(&admin(), harness.account.id).await;

    assert!(
        matches!(result, Err(AppError::Validation(message)) if message.contains("no email address"))
    );
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Pending)
    );
    assert_eq!(harness.retailers.writes(), 0);
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 0);
}

#[tokio::test]
async fn email_failure_does_not_undo_approval() {
    let harness = harness(
        pending("info@detulp.nl"),
        FakeEmailProvider::failing("smtp unreachable"),
    );

    let outcome = harness
        .service
        .approve(&admin(), harness.account.id)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.retailer.status, RetailerStatus::Approved);
    assert!(!outcome.email.succeeded);
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Approved)
    );
}

#[tokio::test]
async fn failed_approval_write_issues_no_token_and_sends_no_email() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());
    harness
        .retailers
        .fail_next_write(AppError::Dependency("connection reset".to_owned()));

    let result = harness.service.approve(&admin(), harness.account.id).await;

    assert!(matches!(result, Err(AppError::Dependency(_))));
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Pending)
    );
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 0);
    assert!(harness.provider.sent().is_empty());
}

#[tokio::test]
async fn failed_rejection_write_sends_no_email() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());
    harness
        .retailers
        .fail_next_write(AppError::Dependency("connection reset".to_owned()));

    let result = harness
        .service
        .reject(&admin(), harness.account.id, Some("KvK-nummer ontbreekt"))
        .await;

    assert!(matches!(result, Err(AppError::Dependency(_))));
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Pending)
    );
    assert!(harness.provider.sent().is_empty());
}

#[tokio::test]
async fn internal_store_error_on_status_write_surfaces_as_dependency() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());
    harness
        .retailers
        .fail_next_write(AppError::Internal("pool exhausted".to_owned()));

    let result = harness.service.approve(&admin(), harness.account.id).await;

    assert!(matches!(result, Err(AppError::Dependency(message)) if message == "pool exhausted"));
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 0);
    assert!(harness.provider.sent().is_empty());
}

#[tokio::test]
async fn reapproval_supersedes_previous_activation_link() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());

    for _ in 0..2 {
        let outcome = harness.service.approve(&admin(), harness.account.id).await;
        assert!(outcome.is_ok());
    }

    let sent = harness.provider.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 1);

    let Some(first) = activation_token_from(&sent[0].text_body) else {
        unreachable!()
    };
    assert!(matches!(
        harness.activation.redeem(&first).await,
        Err(AppError::Expired(_))
    ));
}

#[tokio::test]
async fn reject_without_reason_uses_fallback_and_persists_despite_email_failure() {
    let harness = harness(
        pending("info@detulp.nl"),
        FakeEmailProvider::failing("smtp unreachable"),
    );

    let outcome = harness
        .service
        .review(
            &admin(),
            harness.account.id,
            ReviewAction::Reject { reason: None },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.retailer.status, RetailerStatus::Rejected);
    assert!(!outcome.email.succeeded);
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Rejected)
    );
}

#[tokio::test]
async fn reject_email_quotes_reason_or_fallback() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());

    let first = harness
        .service
        .reject(&admin(), harness.account.id, Some("  "))
        .await;
    assert!(first.is_ok());
    let second = harness
        .service
        .reject(&admin(), harness.account.id, Some("KvK-nummer ontbreekt"))
        .await;
    assert!(second.is_ok());

    let sent = harness.provider.sent();
    assert!(sent[0].text_body.contains(FALLBACK_REJECTION_REASON));
    assert!(sent[1].text_body.contains("KvK-nummer ontbreekt"));
}

#[tokio::test]
async fn unauthorized_actor_causes_zero_mutations() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());

    let approve = harness.service.approve(&outsider(), harness.account.id).await;
    let reject = harness
        .service
        .reject(&outsider(), harness.account.id, None)
        .await;

    assert!(matches!(approve, Err(AppError::Unauthorized(_))));
    assert!(matches!(reject, Err(AppError::Unauthorized(_))));
    assert_eq!(harness.retailers.writes(), 0);
    assert!(harness.provider.sent().is_empty());
    assert_eq!(harness.tokens.open_tokens_for(harness.account.id).await, 0);
}

#[tokio::test]
async fn unknown_retailer_is_not_found() {
    let harness = harness(pending("info@detulp.nl"), FakeEmailProvider::accepting());

    let result = harness.service.approve(&admin(), RetailerId::new()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn rejected_retailer_cannot_be_approved() {
    let harness = harness(
        retailer("info@detulp.nl", RetailerStatus::Rejected),
        FakeEmailProvider::accepting(),
    );

    let result = harness.service.approve(&admin(), harness.account.id).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(harness.retailers.writes(), 0);
    assert!(harness.provider.sent().is_empty());
}

#[tokio::test]
async fn active_retailer_cannot_be_rejected() {
    let harness = harness(
        retailer("info@detulp.nl", RetailerStatus::Active),
        FakeEmailProvider::accepting(),
    );

    let result = harness
        .service
        .review(
            &admin(),
            harness.account.id,
            ReviewAction::Reject {
                reason: Some("te laat".to_owned()),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(
        harness.retailers.status_of(harness.account.id).await,
        Some(RetailerStatus::Active)
    );
}
