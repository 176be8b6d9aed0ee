//! Decoding of Stripe webhook events into [`BillingEvent`]s.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::PaymentsError;
use crate::domain::{BillingEvent, CheckoutCompleted};

/// Metadata keys written on checkout sessions and read back on completion.
pub(super) const META_AUTH_SUBJECT: &str = "auth_subject";
pub(super) const META_PLAN: &str = "plan";
pub(super) const META_INTERVAL: &str = "billing_interval";

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

fn string_at(object: &Value, pointer: &str) -> Option<String> {
    object
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Id of a field that may be a bare id or an expanded object.
fn id_at(object: &Value, field: &str) -> Option<String> {
    match object.get(field)? {
        Value::String(id) => Some(id.clone()),
        Value::Object(expanded) => expanded.get("id").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}

fn period_end(object: &Value) -> Option<DateTime<Utc>> {
    object
        .get("current_period_end")
        .or_else(|| object.pointer("/items/data/0/current_period_end"))
        .and_then(Value::as_i64)
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
}

fn invoice_subscription(object: &Value) -> Option<String> {
    id_at(object, "subscription")
        .or_else(|| string_at(object, "/parent/subscription_details/subscription"))
}

fn required_id(object: &Value) -> Result<String, PaymentsError> {
    string_at(object, "/id").ok_or_else(|| PaymentsError::decode("event object has no id"))
}

/// Decode a verified webhook body.
pub(super) fn decode_event(payload: &[u8]) -> Result<BillingEvent, PaymentsError> {
    let envelope: EventEnvelope =
        serde_json::from_slice(payload).map_err(|err| PaymentsError::decode(err.to_string()))?;
    let object = &envelope.data.object;
    let event = match envelope.event_type.as_str() {
        "checkout.session.completed" => BillingEvent::CheckoutCompleted(CheckoutCompleted {
            auth_subject: string_at(object, &format!("/metadata/{META_AUTH_SUBJECT}")),
            plan: string_at(object, &format!("/metadata/{META_PLAN}")),
            interval: string_at(object, &format!("/metadata/{META_INTERVAL}")),
            customer_id: id_at(object, "customer"),
            subscription_id: id_at(object, "subscription"),
        }),
        "customer.subscription.updated" => BillingEvent::SubscriptionUpdated {
            subscription_id: required_id(object)?,
            status: string_at(object, "/status")
                .ok_or_else(|| PaymentsError::decode("subscription has no status"))?,
            current_period_end: period_end(object),
        },
        "customer.subscription.deleted" => BillingEvent::SubscriptionDeleted {
            subscription_id: required_id(object)?,
        },
        "invoice.payment_failed" => BillingEvent::PaymentFailed {
            subscription_id: invoice_subscription(object),
        },
        "invoice.payment_succeeded" => BillingEvent::PaymentSucceeded {
            subscription_id: invoice_subscription(object),
        },
        other => BillingEvent::Other {
            event_type: other.to_owned(),
        },
    };
    Ok(event)
}
