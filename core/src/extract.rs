//! Best-effort extraction of human-readable messages from error bodies.
//!
//! Servers disagree on error shapes. Two passes cover the common ones:
//!
//! - [`extract_error_message`] reads a raw response body shaped like
//!   `{"title": "...", "errors": ...}` (problem-details style).
//! - [`extract_embedded_message`] digs a `{"message": "..."}` object out of
//!   a longer free-text message, typically one that ends in
//!   `Response: {...}`.
//!
//! Neither pass fails. Bad input degrades to a fixed string or `None`.

use serde_json::{Map, Value};

const NO_MESSAGE_RECEIVED: &str = "No error message received";
const NO_DETAILED_MESSAGE: &str = "No detailed error message found";
const NO_DETAILED_ERRORS: &str = "No detailed errors found";
const RESPONSE_MARKER: &str = "response:";

/// Render a JSON value the way a person would read it: strings without
/// quotes, everything else as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_null<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// Extract a message from a raw error body.
pub fn extract_error_message(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return NO_MESSAGE_RECEIVED.to_string(),
    };

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return NO_DETAILED_MESSAGE.to_string(),
        Err(err) => return format!("Error parsing error message: {err}"),
    };

    let errors = non_null(&object, "errors")
        .map(stringify)
        .unwrap_or_else(|| NO_DETAILED_ERRORS.to_string());

    match non_null(&object, "title").map(stringify) {
        Some(title) if !title.is_empty() => format!("{title}: {errors}"),
        _ => errors,
    }
}

/// Find a JSON object inside `text` and return its `message` field.
///
/// The object is looked for after a case-insensitive `Response:` marker
/// when one exists, otherwise at the first `{`. The object must close the
/// text: anything but whitespace after it counts as unparseable.
pub fn extract_embedded_message(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let start = match lowered.find(RESPONSE_MARKER) {
        Some(marker) => marker + text[marker..].find('{')?,
        None => text.find('{')?,
    };

    let object = match serde_json::from_str::<Value>(&text[start..]) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse error message JSON");
            return None;
        }
    };

    let message = non_null(&object, "message").or_else(|| {
        object
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case("message") && !value.is_null())
            .map(|(_, value)| value)
    })?;
    Some(stringify(message))
}

/// The embedded `message` of `text` if there is one, else `text` itself.
pub fn refine_error_message(text: String) -> String {
    extract_embedded_message(&text).unwrap_or(text)
}
