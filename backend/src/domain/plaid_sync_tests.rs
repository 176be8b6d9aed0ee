//! Tests for bank-account reconciliation.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    ExchangedItem, MockBankDataSource, MockTokenCipher, PlaidItemRepository,
};
use crate::domain::{
    AssetCategory, ErrorCode, PlaidItemStatus, PlaidWebhookError, SealedToken,
    UpstreamBalances,
};
use crate::test_support::{
    InMemoryAssets, InMemoryPlaidAccounts, InMemoryPlaidItems, fixture_clock, fixture_now,
};

fn account(id: &str, account_type: &str, current: Option<f64>) -> UpstreamAccount {
    UpstreamAccount {
        account_id: id.to_owned(),
        name: format!("{account_type} account"),
        official_name: None,
        account_type: account_type.to_owned(),
        subtype: None,
        mask: Some("4242".to_owned()),
        balances: UpstreamBalances {
            current,
            available: None,
            iso_currency_code: None,
        },
    }
}

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
        .returning(|_| Ok("access-sandbox-1".to_owned()));
    cipher
}

fn bank_returning(accounts: Vec<UpstreamAccount>) -> MockBankDataSource {
    let mut bank = MockBankDataSource::new();
    bank.expect_fetch_accounts()
        .with(eq("access-sandbox-1"))
        .returning(move |_| Ok(accounts.clone()));
    bank
}

struct Harness {
    items: Arc<InMemoryPlaidItems>,
    accounts: Arc<InMemoryPlaidAccounts>,
    assets: Arc<InMemoryAssets>,
    user_id: UserId,
}

impl Harness {
    fn service(&self, bank: MockBankDataSource) -> PlaidSyncService {
        PlaidSyncService::new(PlaidSyncPorts {
            items: self.items.clone(),
            accounts: self.accounts.clone(),
            assets: self.assets.clone(),
            bank: Arc::new(bank),
            cipher: Arc::new(passthrough_cipher()),
            clock: fixture_clock(),
        })
    }

    async fn item(&self, plaid_item_id: &str) -> PlaidItem {
        self.items
            .upsert(&NewPlaidItem {
                user_id: self.user_id,
                plaid_item_id: plaid_item_id.to_owned(),
                access_token: sealed(),
                institution_id: Some("ins_1".to_owned()),
                institution_name: Some("First Platypus Bank".to_owned()),
            })
            .await
            .expect("item stored")
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        items: Arc::new(InMemoryPlaidItems::default()),
        accounts: Arc::new(InMemoryPlaidAccounts::default()),
        assets: Arc::new(InMemoryAssets::default()),
        user_id: UserId::random(),
    }
}

#[rstest]
#[tokio::test]
async fn repeated_syncs_do_not_duplicate_rows(harness: Harness) {
    let item = harness.item("item-1").await;
    let service = harness.service(bank_returning(vec![
        account("acc-checking", "depository", Some(1_250.55)),
        account("acc-brokerage", "investment", Some(98_000.0)),
    ]));

    for _ in 0..3 {
        let processed = service.sync_item(&item).await.expect("sync succeeds");
        assert_eq!(processed, 2);
    }

    assert_eq!(harness.accounts.all().len(), 2);
    let assets = harness.assets.all();
    assert_eq!(assets.len(), 2);
    assert!(assets.iter().all(|asset| asset.source == AssetSource::Plaid));
    let checking = assets
        .iter()
        .find(|asset| asset.plaid_account_id.as_deref() == Some("acc-checking"))
        .expect("checking asset");
    assert_eq!(checking.value, Cents::new(125_055));
    assert_eq!(checking.category, AssetCategory::Cash);
    assert_eq!(checking.institution.as_deref(), Some("First Platypus Bank"));
}

#[rstest]
#[tokio::test]
async fn resync_refreshes_balances_in_place(harness: Harness) {
    let item = harness.item("item-1").await;
    harness
        .service(bank_returning(vec![account("acc-1", "depository", Some(10.0))]))
        .sync_item(&item)
        .await
        .expect("first sync");
    harness
        .service(bank_returning(vec![account("acc-1", "depository", Some(25.5))]))
        .sync_item(&item)
        .await
        .expect("second sync");

    let assets = harness.assets.all();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].value, Cents::new(2_550));
    let accounts = harness.accounts.all();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].record.current_balance, Some(Cents::new(2_550)));
}

#[rstest]
#[case("credit", Some(1_500.0), -150_000)]
#[case("loan", Some(320_000.0), -32_000_000)]
#[case("credit", Some(-20.0), -2_000)]
#[case("loan", None, 0)]
#[tokio::test]
async fn liabilities_become_non_positive_assets(
    harness: Harness,
    #[case] account_type: &str,
    #[case] balance: Option<f64>,
    #[case] expected: i64,
) {
    let item = harness.item("item-1").await;
    harness
        .service(bank_returning(vec![account("acc-1", account_type, balance)]))
        .sync_item(&item)
        .await
        .expect("sync succeeds");

    let assets = harness.assets.all();
    assert_eq!(assets[0].value, Cents::new(expected));
    assert!(!assets[0].value.is_positive());
}

#[rstest]
#[tokio::test]
async fn sync_stamps_item_and_defaults_currency(harness: Harness) {
    let item = harness.item("item-1").await;
    harness
        .service(bank_returning(vec![account("acc-1", "depository", Some(1.0))]))
        .sync_item(&item)
        .await
        .expect("sync succeeds");

    let stored = harness.items.all();
    assert_eq!(stored[0].last_synced_at, Some(fixture_now()));
    assert_eq!(harness.assets.all()[0].currency, "USD");
}

#[rstest]
#[tokio::test]
async fn batch_flags_failures_and_continues(harness: Harness) {
    harness.item("item-good").await;
    let bad = harness.item("item-bad").await;
    let mut calls = 0;
    let mut bank = MockBankDataSource::new();
    bank.expect_fetch_accounts().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(vec![account("acc-1", "depository", Some(5.0))])
        } else {
            Err(BankDataError::upstream("ITEM_LOGIN_REQUIRED", "login required"))
        }
    });

    let report = harness
        .service(bank)
        .sync_all_active()
        .await
        .expect("batch completes");

    assert_eq!(
        report,
        SyncReport {
            synced: 1,
            failed: 1,
            total: 2
        }
    );
    let flagged = harness
        .items
        .all()
        .into_iter()
        .find(|item| item.id == bad.id)
        .expect("bad item kept");
    assert_eq!(flagged.status, PlaidItemStatus::Error);
    assert!(flagged.error_code.is_some());
}

#[rstest]
#[tokio::test]
async fn user_batch_only_touches_that_user(harness: Harness) {
    harness.item("item-1").await;
    let report = harness
        .service(bank_returning(Vec::new()))
        .sync_user_items(&UserId::random())
        .await
        .expect("batch completes");
    assert_eq!(report.total, 0);
}

#[rstest]
#[tokio::test]
async fn link_item_seals_stores_and_syncs(harness: Harness) {
    let mut bank = bank_returning(vec![account("acc-1", "investment", Some(42.0))]);
    bank.expect_exchange_public_token()
        .with(eq("public-sandbox-1"))
        .return_once(|_| {
            Ok(ExchangedItem {
                access_token: "access-sandbox-1".to_owned(),
                item_id: "item-new".to_owned(),
            })
        });

    let item = harness
        .service(bank)
        .link_item(
            &harness.user_id,
            "public-sandbox-1",
            LinkedInstitution {
                id: Some("ins_3".to_owned()),
                name: Some("Chase".to_owned()),
            },
        )
        .await
        .expect("link succeeds");

    assert_eq!(item.plaid_item_id, "item-new");
    assert_eq!(item.access_token, sealed());
    assert_eq!(harness.assets.all().len(), 1);
}

#[rstest]
#[tokio::test]
async fn link_item_requires_public_token(harness: Harness) {
    let mut bank = MockBankDataSource::new();
    bank.expect_exchange_public_token().never();
    let err = harness
        .service(bank)
        .link_item(&harness.user_id, "  ", LinkedInstitution::default())
        .await
        .expect_err("blank token refused");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

fn webhook(webhook_type: &str, webhook_code: &str, item_id: Option<&str>) -> PlaidWebhook {
    PlaidWebhook {
        webhook_type: webhook_type.to_owned(),
        webhook_code: webhook_code.to_owned(),
        item_id: item_id.map(str::to_owned),
        error: None,
    }
}

#[rstest]
#[tokio::test]
async fn item_error_webhook_marks_item(harness: Harness) {
    harness.item("item-1").await;
    let mut event = webhook("ITEM", "ERROR", Some("item-1"));
    event.error = Some(PlaidWebhookError {
        error_code: Some("ITEM_LOGIN_REQUIRED".to_owned()),
    });

    let outcome = harness
        .service(MockBankDataSource::new())
        .handle_webhook(&event)
        .await
        .expect("webhook handled");

    assert_eq!(outcome, WebhookOutcome::MarkedError);
    let stored = harness.items.all();
    assert_eq!(stored[0].status, PlaidItemStatus::Error);
    assert_eq!(stored[0].error_code.as_deref(), Some("ITEM_LOGIN_REQUIRED"));
}

#[rstest]
#[tokio::test]
async fn item_error_without_code_uses_default(harness: Harness) {
    harness.item("item-1").await;
    harness
        .service(MockBankDataSource::new())
        .handle_webhook(&webhook("ITEM", "ERROR", Some("item-1")))
        .await
        .expect("webhook handled");
    assert_eq!(
        harness.items.all()[0].error_code.as_deref(),
        Some(DEFAULT_ITEM_ERROR_CODE)
    );
}

#[rstest]
#[case("HOLDINGS", WebhookOutcome::Synced)]
#[case("TRANSACTIONS", WebhookOutcome::Synced)]
#[case("INVESTMENTS_TRANSACTIONS", WebhookOutcome::Synced)]
#[case("AUTH", WebhookOutcome::Acknowledged)]
#[tokio::test]
async fn data_webhooks_trigger_sync(
    harness: Harness,
    #[case] webhook_type: &str,
    #[case] expected: WebhookOutcome,
) {
    harness.item("item-1").await;
    let outcome = harness
        .service(bank_returning(vec![account("acc-1", "depository", Some(1.0))]))
        .handle_webhook(&webhook(webhook_type, "DEFAULT_UPDATE", Some("item-1")))
        .await
        .expect("webhook handled");
    assert_eq!(outcome, expected);
}

#[rstest]
#[case(None)]
#[case(Some("item-unknown"))]
#[tokio::test]
async fn unknown_items_are_ignored(harness: Harness, #[case] item_id: Option<&str>) {
    let mut bank = MockBankDataSource::new();
    bank.expect_fetch_accounts().never();
    let outcome = harness
        .service(bank)
        .handle_webhook(&webhook("HOLDINGS", "DEFAULT_UPDATE", item_id))
        .await
        .expect("webhook handled");
    assert_eq!(outcome, WebhookOutcome::Ignored);
}
