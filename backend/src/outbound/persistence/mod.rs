//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel row structs and
//! domain types; they hold no business rules. Row structs (`models.rs`) and
//! the table definitions (`schema.rs`) stay private to this module.
//!
//! ```ignore
//! use patrimony::outbound::persistence::{DbPool, DieselAssetRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/patrimony")).await?;
//! let assets = DieselAssetRepository::new(pool);
//! ```

mod diesel_asset_repository;
mod diesel_document_repository;
mod diesel_entity_repository;
pub(crate) mod diesel_helpers;
mod diesel_insight_repository;
mod diesel_plaid_account_repository;
mod diesel_plaid_item_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_asset_repository::DieselAssetRepository;
pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_entity_repository::DieselEntityRepository;
pub use diesel_insight_repository::DieselInsightRepository;
pub use diesel_plaid_account_repository::DieselPlaidAccountRepository;
pub use diesel_plaid_item_repository::DieselPlaidItemRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
