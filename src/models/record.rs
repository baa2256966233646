//! Identifier extraction for opaque trademark records.

use serde_json::Value;

use crate::api::HarvestError;

// Each document carries exactly one trademark with one application number;
// the API nests both inside trademarkTypeChoice1.
const TYPE_CHOICE_POINTER: &str =
    "/trademarkApplication/trademarkBag/trademark/0/trademarkTypeChoice1";

/// Derive the composite identifier for a record.
///
/// The identifier is `"<applicationNumber>"`, or
/// `"<applicationNumber>/<registrationNumber>"` when a registration number is
/// present. Missing application-number fields are a [`HarvestError::MalformedRecord`].
pub fn record_identifier(record: &Value) -> Result<String, HarvestError> {
    let type_choice = record.pointer(TYPE_CHOICE_POINTER).ok_or_else(|| {
        HarvestError::MalformedRecord("missing trademarkTypeChoice1".to_string())
    })?;

    let application_number = type_choice
        .pointer("/applicationNumber/0/applicationNumberText")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            HarvestError::MalformedRecord("missing applicationNumberText".to_string())
        })?;

    match type_choice.get("registrationNumber").and_then(as_text) {
        Some(registration_number) => Ok(format!("{application_number}/{registration_number}")),
        None => Ok(application_number.to_string()),
    }
}

/// Text rendering of a scalar JSON value; null and structured values count
/// as absent.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
