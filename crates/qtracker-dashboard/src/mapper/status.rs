//! Status normalization.

use qtracker_hal::StatusValue;
use serde_json::Value;

use crate::dto::CanonicalStatus;

/// Map an upstream status to its canonical form.
///
/// Missing or empty input is `UNKNOWN`. Any non-empty token outside the
/// table is `ERROR`, as is a value no token can be derived from.
pub fn normalize_status(status: Option<&StatusValue>) -> CanonicalStatus {
    let Some(status) = status.filter(|s| !s.is_empty()) else {
        return CanonicalStatus::Unknown;
    };

    match status_token(status) {
        Some(token) => lookup(&token.to_uppercase()),
        None => {
            tracing::error!(?status, "Error normalizing status");
            CanonicalStatus::Error
        }
    }
}

fn status_token(status: &StatusValue) -> Option<String> {
    match status {
        StatusValue::Named { name } => Some(name.clone()),
        StatusValue::Text(text) => Some(text.clone()),
        StatusValue::Other(value) => match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        },
    }
}

fn lookup(token: &str) -> CanonicalStatus {
    match token {
        "QUEUED" => CanonicalStatus::Queued,
        "RUNNING" => CanonicalStatus::Running,
        "COMPLETED" | "DONE" => CanonicalStatus::Completed,
        "ERROR" => CanonicalStatus::Error,
        "CANCELLED" | "CANCELED" => CanonicalStatus::Cancelled,
        _ => CanonicalStatus::Error,
    }
}
