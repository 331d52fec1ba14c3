//! Turning the editor's form state into an [`EffectiveRequest`].

use super::query::{compose_url, split_query, QueryParam};
use super::validate::{validate_method, validate_url, HttpMethod};
use crate::error::ValidationError;
use crate::history::RequestRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One key/value row of the header editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    pub key: String,
    pub value: String,
}

impl HeaderRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The request as it is about to go out: merged URL, header map and parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl EffectiveRequest {
    pub fn new(
        method: HttpMethod,
        url: impl Into<String>,
        headers: HashMap<String, String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// The body that is actually sent and recorded. GET never carries one,
    /// and a JSON `null` counts as no body.
    pub fn outbound_body(&self) -> Option<&Value> {
        if !self.method.carries_body() {
            return None;
        }
        self.body.as_ref().filter(|b| !b.is_null())
    }
}

/// Form state of the request editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub params: Vec<QueryParam>,
    #[serde(default)]
    pub headers: Vec<HeaderRow>,
    /// Raw JSON text from the body editor.
    #[serde(default)]
    pub body: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get.to_string(),
            url: String::new(),
            params: Vec::new(),
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedRequest {
    pub request: EffectiveRequest,
    /// The base URL after validation, `http://`-prefixed if it was rewritten.
    pub base_url: String,
    pub url_rewritten: bool,
}

impl RequestDraft {
    /// Validates the draft and builds the effective request.
    pub fn compose(&self) -> Result<ComposedRequest, ValidationError> {
        let method = validate_method(&self.method)?;
        let base = validate_url(&self.url)?;
        let url = compose_url(&base.normalized_url, &self.params);
        let headers = normalize_headers(&self.headers);
        let body = if method.carries_body() {
            parse_body(&self.body)?
        } else {
            None
        };

        Ok(ComposedRequest {
            request: EffectiveRequest::new(method, url, headers, body),
            base_url: base.normalized_url,
            url_rewritten: base.was_rewritten,
        })
    }

    /// Rebuilds an editable draft from a history record.
    pub fn from_record(record: &RequestRecord) -> Self {
        let (url, params) = split_query(&record.url);

        let mut headers: Vec<HeaderRow> = record
            .headers
            .iter()
            .map(|(k, v)| HeaderRow::new(k, v))
            .collect();
        headers.sort_by(|a, b| a.key.cmp(&b.key));

        let body = record
            .request_body
            .as_ref()
            .and_then(|b| serde_json::to_string_pretty(b).ok())
            .unwrap_or_default();

        Self {
            method: record.method.to_string(),
            url,
            params,
            headers,
            body,
        }
    }
}

/// Trims header rows and drops any whose key or value ends up blank.
pub fn normalize_headers(rows: &[HeaderRow]) -> HashMap<String, String> {
    rows.iter()
        .filter_map(|row| {
            let key = row.key.trim();
            let value = row.value.trim();
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

/// Parses body editor text. Blank text means no body.
pub fn parse_body(text: &str) -> Result<Option<Value>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|_| ValidationError::InvalidJsonBody)
}
