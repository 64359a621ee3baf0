//! Reply normalization
//!
//! The endpoint's reply shape is not fixed: different automation backends wrap the text
//! in different envelopes. `normalize` extracts displayable text and never fails; the
//! worst case is the raw body shown verbatim.

use serde_json::Value;
use tracing::debug;

/// Shown when the endpoint answers with an empty body
pub const EMPTY_REPLY_PLACEHOLDER: &str = "Reply received!";

/// Turn a raw reply body into display text.
///
/// Checked in order, first match wins:
/// 1. not JSON: the raw body (or [`EMPTY_REPLY_PLACEHOLDER`] when empty)
/// 2. `{ "response": .. }`
/// 3. `[{ "message": { "content": .. } }, ..]`
/// 4. `{ "message": { "content": .. } }`
/// 5. `{ "content": .. }`
/// 6. a bare JSON string
/// 7. the raw body
///
/// A field counts only when it is not `null`, `false`, zero or an empty string.
pub fn normalize(raw: &str) -> String {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Reply is not JSON ({}), showing it verbatim", e);
            if raw.is_empty() {
                return EMPTY_REPLY_PLACEHOLDER.to_string();
            }
            return raw.to_string();
        }
    };

    if let Some(response) = present(parsed.get("response")) {
        return display(response);
    }

    if let Some(first) = parsed.as_array().and_then(|items| items.first()) {
        if let Some(content) = message_content(first) {
            return display(content);
        }
    }

    if let Some(content) = message_content(&parsed) {
        return display(content);
    }

    if let Some(content) = present(parsed.get("content")) {
        return display(content);
    }

    if let Value::String(text) = &parsed {
        if !text.is_empty() {
            return text.clone();
        }
    }

    debug!("Reply JSON has no known envelope, showing it verbatim");
    raw.to_string()
}

/// `null`, `false`, `0` and `""` count as absent
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn message_content(value: &Value) -> Option<&Value> {
    present(value.get("message").and_then(|message| message.get("content")))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
