//! Query-string composition for the effective URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters left untouched when encoding a query component: ASCII
/// alphanumerics plus `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One key/value row of the query-parameter editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Percent-encodes a single query key or value.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Merges `params` into `base`, producing the effective URL.
///
/// Rows with a blank key are dropped. With nothing left, `base` comes back
/// unchanged; otherwise the pairs are appended after `?` (or `&` when `base`
/// already carries a query) in input order.
pub fn compose_url(base: &str, params: &[QueryParam]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .map(|p| format!("{}={}", encode_component(&p.key), encode_component(&p.value)))
        .collect();

    if pairs.is_empty() {
        return base.to_string();
    }

    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, pairs.join("&"))
}

/// Splits a stored URL back into its base and decoded query rows.
///
/// The split happens at the first `?`; a URL without one yields no rows.
pub fn split_query(url: &str) -> (String, Vec<QueryParam>) {
    match url.split_once('?') {
        Some((base, query)) => {
            let query = query.split('#').next().unwrap_or_default();
            let params = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| QueryParam::new(k, v))
                .collect();
            (base.to_string(), params)
        }
        None => (url.to_string(), Vec::new()),
    }
}
