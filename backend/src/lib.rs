//! Patrimony backend library.
//!
//! Hexagonal layout: [`domain`] holds the wealth-management rules and the
//! port traits, [`inbound`] adapts HTTP requests onto domain services and
//! [`outbound`] implements the ports against PostgreSQL and vendor APIs.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
