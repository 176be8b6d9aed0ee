//! Stripe outbound adapter implementing `PaymentsGateway`.

mod events;
mod http_client;
mod signature;

pub use http_client::{DEFAULT_STRIPE_BASE_URL, StripeConfig, StripeHttpGateway};
