//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the wealth-management rules (money handling, account
//! reconciliation, access gating, billing and insight generation) free of
//! HTTP and database concerns. Services talk to the outside world only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - Cents — monetary amounts stored as whole cents.
//! - AccessGate — `current_user` / `require_subscription` checks.
//! - PlaidSyncService, InsightService, BillingService — the workflows.

pub mod access;
pub mod account_service;
pub mod asset;
pub mod asset_service;
pub mod billing;
pub mod document;
pub mod document_service;
pub mod entity;
pub mod entity_service;
pub mod error;
pub mod insight;
pub mod insight_service;
pub mod money;
pub mod plaid;
pub mod plaid_sync;
pub mod portfolio;
pub mod ports;
pub mod seed_data;
pub mod subscription;
pub mod trace_id;
pub mod user;

pub use self::access::{AccessDenied, AccessGate, AuthIdentity, SubscribedUser};
pub use self::account_service::{AccountService, OnboardingSubmission};
pub use self::asset::{
    Asset, AssetCategory, AssetSource, AssetUpdate, DEFAULT_CURRENCY, NewAsset, ParseAssetError,
};
pub use self::asset_service::{AssetDraft, AssetPatch, AssetService};
pub use self::billing::{
    BillingEvent, BillingOutcome, BillingPorts, BillingService, CheckoutCompleted,
    CheckoutSessionRequest,
};
pub use self::document::{
    Document, DocumentCategory, DocumentMime, DocumentUploadError, MAX_DOCUMENT_BYTES,
    NewDocument, default_document_name, document_blob_path, validate_upload,
};
pub use self::document_service::{DocumentService, DocumentUpload};
pub use self::entity::{
    Entity, EntityKind, EntitySummary, NewEntity, ParseEntityKindError, summarize_entities,
};
pub use self::entity_service::{EntityDraft, EntityService};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::insight::{
    INSIGHT_RETENTION_DAYS, Insight, InsightCategory, InsightPriority, NewInsight,
    retention_cutoff,
};
pub use self::insight_service::{
    GenerationReport, INSIGHT_SYSTEM_PROMPT, InsightPorts, InsightService, extract_insights,
};
pub use self::money::{Cents, MoneyError};
pub use self::plaid::{
    DEFAULT_ITEM_ERROR_CODE, FALLBACK_ISO_CURRENCY, LinkedInstitution, NewPlaidItem, PlaidAccount,
    PlaidAccountRecord, PlaidItem, PlaidItemStatus, PlaidWebhook, PlaidWebhookError, SealedToken,
    SyncReport, UpstreamAccount, UpstreamBalances, category_for_account_type, is_liability,
    signed_asset_value,
};
pub use self::plaid_sync::{PlaidSyncPorts, PlaidSyncService, WebhookOutcome};
pub use self::portfolio::{
    AllocationSlice, EntityRollup, Holding, PortfolioContext, PortfolioService, TOP_HOLDINGS,
};
pub use self::seed_data::{DemoPortfolioSeeder, SeedOutcome};
pub use self::subscription::{
    BillingInterval, ParseBillingError, Plan, Subscription, SubscriptionStatus, TRIAL_DAYS,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    AuthSubject, NotificationSettings, NotificationSettingsPatch, OnboardingProfile, User,
    UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use patrimony::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
