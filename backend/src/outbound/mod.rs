//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **plaid**, **stripe**, **anthropic**, **blob**: reqwest vendor clients
//! - **identity**: RS256 session token verification
//! - **crypto**: AES-256-GCM sealing of aggregator access tokens
//!
//! Adapters translate between domain types and vendor representations. They
//! contain no business logic.

pub mod anthropic;
pub mod blob;
pub mod crypto;
mod http_body;
pub mod identity;
pub mod persistence;
pub mod plaid;
pub mod stripe;
