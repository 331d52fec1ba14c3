//! Outcome building for proxied calls.
//!
//! Turns raw remote payloads into JSON values, measures their serialized
//! size and folds transport failures into the same [`Outcome`] shape.

use super::types::*;
use crate::shared::DetailedTiming;
use base64::Engine;
use serde_json::Value;

/// Determines if response body is likely binary based on content-type.
///
/// # Arguments
///
/// * `content_type` - The Content-Type header value
///
/// # Returns
///
/// `true` if the content is likely binary, `false` otherwise.
pub fn is_binary_content(content_type: Option<&str>) -> bool {
    let ct = match content_type {
        Some(ct) => ct.to_lowercase(),
        None => return false,
    };

    let text_types = [
        "text/",
        "application/json",
        "application/xml",
        "application/javascript",
        "application/x-javascript",
        "application/ecmascript",
        "application/x-www-form-urlencoded",
        "+json",
        "+xml",
    ];

    !text_types.iter().any(|t| ct.contains(t))
}

/// Decodes a response payload into a JSON value.
///
/// JSON payloads keep their structure, text becomes a JSON string and
/// binary content becomes a base64 JSON string.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> Value {
    if is_binary_content(content_type) {
        return Value::String(base64::engine::general_purpose::STANDARD.encode(body));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    }
}

/// Byte length of `value` serialized as JSON.
pub fn serialized_size(value: &Value) -> u64 {
    serde_json::to_vec(value).map(|v| v.len() as u64).unwrap_or(0)
}

/// Builds a success outcome from a completed exchange.
pub fn build_success(remote: RemoteResponse, timing: &mut DetailedTiming) -> Outcome {
    let RemoteResponse {
        status,
        headers,
        body_bytes,
    } = remote;

    let content_type = headers.get("content-type").map(|s| s.as_str());
    let body = decode_body(&body_bytes, content_type);
    let response_size_bytes = serialized_size(&body);

    timing.finish();
    let timing = timing.to_timing_info();

    Outcome::Success(ProxySuccess {
        status,
        headers,
        body,
        response_time_ms: timing.total,
        response_size_bytes,
        timing,
    })
}

/// Builds a failure outcome; no size is reported for failures.
pub fn build_failure(failure: TransportFailure, timing: &mut DetailedTiming) -> Outcome {
    timing.finish();

    Outcome::Failure(ProxyFailure {
        status: failure.status,
        code: failure.code,
        message: failure.message,
        response_time_ms: timing.total_ms(),
    })
}
