//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
        }
    }
}

fn field_error(message: impl Into<String>, field: &str, code: ValidationCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(message: &str, field: &str) -> Error {
    field_error(message, field, ValidationCode::MissingField)
}

pub(crate) fn invalid_value_error(message: &str, field: &str, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": ValidationCode::InvalidValue.as_str(),
    }))
}

/// Parse a UUID received in a path segment or form field.
pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": ValidationCode::InvalidUuid.as_str(),
        }))
    })
}

/// Parse an optional UUID, treating blank strings as absent.
pub(crate) fn parse_optional_uuid(value: Option<&str>, field: &str) -> Result<Option<Uuid>, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_uuid(raw, field).map(Some),
        None => Ok(None),
    }
}
