use reqwest::Error;
use serde_json::Value;

use crate::OxaPayApiError;

/// Pulls a human-readable message out of an OxaPay error body. `error.message` wins over the top-level `message`; a
/// body that is not JSON is returned as-is.
pub fn extract_error_message(body: &str) -> String {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(v) => v,
        Err(_) => return body.trim().to_string(),
    };
    let message = [&value["error"]["message"], &value["message"]]
        .into_iter()
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    message
}

/// True if `body` is an error reply written by OxaPay itself, rather than a page from whatever sits in front of it.
pub(crate) fn is_error_envelope(body: &str) -> bool {
    serde_json::from_str::<Value>(body).is_ok_and(|v| v.is_object()) && !extract_error_message(body).is_empty()
}

/// Sorts reqwest failures into "never sent", "timed out" and "unknown outcome".
pub(crate) fn classify_send_error(e: Error) -> OxaPayApiError {
    if e.is_timeout() {
        OxaPayApiError::Timeout(e.to_string())
    } else if e.is_connect() {
        OxaPayApiError::Unreachable(e.to_string())
    } else if e.is_builder() {
        OxaPayApiError::Initialization(e.to_string())
    } else {
        OxaPayApiError::TransportError(e.to_string())
    }
}
