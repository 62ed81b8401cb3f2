//! Detection of the API's in-band `Error` envelope.

use serde_json::Value;

use crate::decode::Decoded;
use crate::error::{ApiError, Result};

/// Turns a decoded `Error` envelope into `ApiError::Service`; any other
/// result passes through unchanged.
///
/// The envelope looks like
/// `<CanvasResult><Error><Description>..</Description><ErrorCode>..</ErrorCode></Error></CanvasResult>`.
/// Raw bodies are never inspected.
pub fn unwrap_service_error(decoded: Decoded) -> Result<Decoded> {
    let envelope = decoded.as_xml().and_then(|value| value.get("Error"));
    match envelope.and_then(service_error) {
        Some(err) => Err(err),
        None => Ok(decoded),
    }
}

fn service_error(error: &Value) -> Option<ApiError> {
    match error {
        Value::Object(fields) => Some(ApiError::service(
            scalar(fields.get("Description")),
            scalar(fields.get("ErrorCode")),
        )),
        Value::String(text) if text.is_empty() => None,
        other => Some(ApiError::service(scalar(Some(other)), "")),
    }
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
