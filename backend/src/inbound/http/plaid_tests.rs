//! Tests for the bank-link handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    ExchangedItem, MockBankDataSource, MockPlaidWebhookVerifier, MockTokenCipher,
    PlaidItemRepository,
};
use crate::domain::{
    AssetSource, Cents, NewPlaidItem, PlaidItemStatus, SealedToken, SubscriptionStatus,
    UpstreamAccount, UpstreamBalances, User,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::test_utils::{TestPorts, as_user, send, settings};

const SUBJECT: &str = "user_plaid";
const ACCESS_TOKEN: &str = "access-sandbox-7";

fn sealed() -> SealedToken {
    SealedToken {
        ciphertext: "c2VhbGVk".to_owned(),
        nonce: "bm9uY2U=".to_owned(),
    }
}

fn passthrough_cipher() -> MockTokenCipher {
    let mut cipher = MockTokenCipher::new();
    cipher.expect_seal().returning(|_| Ok(sealed()));
    cipher
        .expect_open()
        .returning(|_| Ok(ACCESS_TOKEN.to_owned()));
    cipher
}

fn upstream(id: &str, account_type: &str, current: f64) -> UpstreamAccount {
    UpstreamAccount {
        account_id: id.to_owned(),
        name: format!("{account_type} account"),
        official_name: None,
        account_type: account_type.to_owned(),
        subtype: None,
        mask: Some("0042".to_owned()),
        balances: UpstreamBalances {
            current: Some(current),
            available: None,
            iso_currency_code: Some("USD".to_owned()),
        },
    }
}

fn linked_bank() -> MockBankDataSource {
    let mut bank = MockBankDataSource::new();
    bank.expect_create_link_token()
        .returning(|_| Ok("link-sandbox-abc".to_owned()));
    bank.expect_exchange_public_token().returning(|_| {
        Ok(ExchangedItem {
            access_token: ACCESS_TOKEN.to_owned(),
            item_id: "item-sandbox-1".to_owned(),
        })
    });
    bank.expect_fetch_accounts().returning(|_| {
        Ok(vec![
            upstream("acc-checking", "depository", 12_500.75),
            upstream("acc-card", "credit", 1_800.0),
            upstream("acc-mortgage", "loan", 420_000.0),
        ])
    });
    bank
}

fn state(ports: &TestPorts, bank: MockBankDataSource, verifier: MockPlaidWebhookVerifier) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            bank: Arc::new(bank),
            cipher: Arc::new(passthrough_cipher()),
            plaid_webhooks: Arc::new(verifier),
            ..ports.ports()
        },
        settings(),
    )
}

async fn subscribed(ports: &TestPorts) -> User {
    ports.subscriber(SUBJECT, SubscriptionStatus::Active).await
}

fn exchange(body: Value) -> actix_test::TestRequest {
    as_user(
        actix_test::TestRequest::post()
            .uri("/api/v1/plaid/exchange-token")
            .set_json(body),
        SUBJECT,
    )
}

fn webhook(body: &Value, signature: Option<&str>) -> actix_test::TestRequest {
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/plaid/webhook")
        .set_payload(body.to_string());
    match signature {
        Some(signature) => req.insert_header((PLAID_VERIFICATION_HEADER, signature.to_owned())),
        None => req,
    }
}

fn accepting_verifier() -> MockPlaidWebhookVerifier {
    let mut verifier = MockPlaidWebhookVerifier::new();
    verifier.expect_verify().returning(|_, _| Ok(()));
    verifier
}

#[actix_web::test]
async fn link_token_is_returned_in_camel_case() {
    let ports = TestPorts::default();
    subscribed(&ports).await;
    let req = as_user(
        actix_test::TestRequest::post().uri("/api/v1/plaid/link-token"),
        SUBJECT,
    );
    let (status, body) = send(state(&ports, linked_bank(), MockPlaidWebhookVerifier::new()), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "linkToken": "link-sandbox-abc" }));
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "publicToken": "   " }))]
#[actix_web::test]
async fn exchange_requires_a_public_token(#[case] body: Value) {
    let ports = TestPorts::default();
    subscribed(&ports).await;
    let mut bank = MockBankDataSource::new();
    bank.expect_exchange_public_token().never();
    let (status, response) = send(
        state(&ports, bank, MockPlaidWebhookVerifier::new()),
        exchange(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Public token is required");
}

#[actix_web::test]
async fn relinking_converges_without_duplicates_and_liabilities_are_negative() {
    let ports = TestPorts::default();
    let user = subscribed(&ports).await;
    let body = json!({
        "publicToken": "public-sandbox-1",
        "institutionId": "ins_109508",
        "institutionName": "First Platypus Bank"
    });

    for _ in 0..2 {
        let (status, response) = send(
            state(&ports, linked_bank(), MockPlaidWebhookVerifier::new()),
            exchange(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["success"], true);
        assert!(response["itemId"].is_string());
    }

    assert_eq!(ports.plaid_items.all().len(), 1);
    assert_eq!(ports.plaid_accounts.all().len(), 3);
    let assets = ports.assets.all();
    assert_eq!(assets.len(), 3);
    for asset in &assets {
        assert_eq!(asset.user_id, user.id);
        assert_eq!(asset.source, AssetSource::Plaid);
        assert_eq!(asset.institution.as_deref(), Some("First Platypus Bank"));
    }
    let value_of = |account: &str| {
        assets
            .iter()
            .find(|asset| asset.plaid_account_id.as_deref() == Some(account))
            .map(|asset| asset.value)
    };
    assert_eq!(value_of("acc-checking"), Some(Cents::new(1_250_075)));
    assert_eq!(value_of("acc-card"), Some(Cents::new(-180_000)));
    assert_eq!(value_of("acc-mortgage"), Some(Cents::new(-42_000_000)));
}

#[actix_web::test]
async fn manual_sync_reports_counts() {
    let ports = TestPorts::default();
    let user = subscribed(&ports).await;
    ports
        .plaid_items
        .upsert(&NewPlaidItem {
            user_id: user.id,
            plaid_item_id: "item-sandbox-1".to_owned(),
            access_token: sealed(),
            institution_id: None,
            institution_name: None,
        })
        .await
        .expect("store item");

    let req = as_user(actix_test::TestRequest::post().uri("/api/v1/plaid/sync"), SUBJECT);
    let (status, body) = send(state(&ports, linked_bank(), MockPlaidWebhookVerifier::new()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "synced": 1, "failed": 0, "total": 1 })
    );
}

#[actix_web::test]
async fn webhook_without_signature_is_rejected() {
    let ports = TestPorts::default();
    let mut verifier = MockPlaidWebhookVerifier::new();
    verifier.expect_verify().never();
    let body = json!({ "webhook_type": "ITEM", "webhook_code": "ERROR", "item_id": "item-1" });
    let (status, _) = send(state(&ports, MockBankDataSource::new(), verifier), webhook(&body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn webhook_with_bad_signature_is_rejected() {
    let ports = TestPorts::default();
    let mut verifier = MockPlaidWebhookVerifier::new();
    verifier
        .expect_verify()
        .returning(|_, _| Err(WebhookVerificationError::invalid_signature("body hash mismatch")));
    let body = json!({ "webhook_type": "ITEM", "webhook_code": "ERROR", "item_id": "item-1" });
    let (status, response) = send(
        state(&ports, MockBankDataSource::new(), verifier),
        webhook(&body, Some("eyJhbGciOiJFUzI1NiJ9.e30.sig")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"], "Invalid webhook signature");
}

#[actix_web::test]
async fn verified_item_error_webhook_flags_the_item() {
    let ports = TestPorts::default();
    let user = subscribed(&ports).await;
    ports
        .plaid_items
        .upsert(&NewPlaidItem {
            user_id: user.id,
            plaid_item_id: "item-sandbox-1".to_owned(),
            access_token: sealed(),
            institution_id: None,
            institution_name: None,
        })
        .await
        .expect("store item");

    let body = json!({
        "webhook_type": "ITEM",
        "webhook_code": "ERROR",
        "item_id": "item-sandbox-1",
        "error": { "error_code": "ITEM_LOGIN_REQUIRED" }
    });
    let (status, response) = send(
        state(&ports, MockBankDataSource::new(), accepting_verifier()),
        webhook(&body, Some("signed")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "received": true }));
    let item = &ports.plaid_items.all()[0];
    assert_eq!(item.status, PlaidItemStatus::Error);
    assert_eq!(item.error_code.as_deref(), Some("ITEM_LOGIN_REQUIRED"));
}

#[actix_web::test]
async fn verified_webhook_for_unknown_item_is_acknowledged() {
    let ports = TestPorts::default();
    let body = json!({ "webhook_type": "TRANSACTIONS", "webhook_code": "DEFAULT_UPDATE", "item_id": "ghost" });
    let (status, response) = send(
        state(&ports, MockBankDataSource::new(), accepting_verifier()),
        webhook(&body, Some("signed")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
}
