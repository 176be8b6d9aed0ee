//! Driven ports: the contracts the domain expects outbound adapters to meet.

mod macros;
pub(crate) use macros::define_port_error;

mod asset_repository;
mod bank_data_source;
mod blob_store;
mod document_repository;
mod entity_repository;
mod identity_provider;
mod insight_model;
mod insight_repository;
mod payments_gateway;
mod plaid_account_repository;
mod plaid_item_repository;
mod plaid_webhook_verifier;
mod repository_error;
mod subscription_repository;
mod token_cipher;
mod user_repository;

#[cfg(test)]
pub use asset_repository::MockAssetRepository;
pub use asset_repository::{AssetRepository, FixtureAssetRepository};
#[cfg(test)]
pub use bank_data_source::MockBankDataSource;
pub use bank_data_source::{BankDataError, BankDataSource, ExchangedItem, FixtureBankDataSource};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentRepository, FixtureDocumentRepository};
#[cfg(test)]
pub use entity_repository::MockEntityRepository;
pub use entity_repository::{EntityRepository, FixtureEntityRepository};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityError, IdentityProvider};
#[cfg(test)]
pub use insight_model::MockInsightModel;
pub use insight_model::{FixtureInsightModel, InsightModel, InsightModelError, InsightPrompt};
#[cfg(test)]
pub use insight_repository::MockInsightRepository;
pub use insight_repository::{FixtureInsightRepository, InsightRepository};
#[cfg(test)]
pub use payments_gateway::MockPaymentsGateway;
pub use payments_gateway::{FixturePaymentsGateway, PaymentsError, PaymentsGateway};
#[cfg(test)]
pub use plaid_account_repository::MockPlaidAccountRepository;
pub use plaid_account_repository::{FixturePlaidAccountRepository, PlaidAccountRepository};
#[cfg(test)]
pub use plaid_item_repository::MockPlaidItemRepository;
pub use plaid_item_repository::{FixturePlaidItemRepository, PlaidItemRepository};
#[cfg(test)]
pub use plaid_webhook_verifier::MockPlaidWebhookVerifier;
pub use plaid_webhook_verifier::{
    FixturePlaidWebhookVerifier, PlaidWebhookVerifier, WebhookVerificationError,
};
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{FixtureSubscriptionRepository, SubscriptionRepository};
#[cfg(test)]
pub use token_cipher::MockTokenCipher;
pub use token_cipher::{FixtureTokenCipher, TokenCipher, TokenCipherError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository};
