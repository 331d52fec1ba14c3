//! Syntactic validation of the method and URL before dispatch.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The methods the proxy accepts, for composition and execution alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a request body is sent for this method.
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ValidationError::InvalidMethod),
        }
    }
}

/// A URL that passed validation.
///
/// `was_rewritten` is set when the input only parsed after prefixing
/// `http://`; callers decide whether to show the rewrite to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    pub normalized_url: String,
    pub was_rewritten: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub method: HttpMethod,
    pub url: ValidatedUrl,
}

pub fn validate_method(method: &str) -> Result<HttpMethod, ValidationError> {
    method.parse()
}

/// Checks that `url` is well-formed, retrying once with an `http://` prefix.
pub fn validate_url(url: &str) -> Result<ValidatedUrl, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::InvalidUrl);
    }

    if url::Url::parse(url).is_ok() {
        return Ok(ValidatedUrl {
            normalized_url: url.to_string(),
            was_rewritten: false,
        });
    }

    let prefixed = format!("http://{}", url);
    match url::Url::parse(&prefixed) {
        Ok(_) => Ok(ValidatedUrl {
            normalized_url: prefixed,
            was_rewritten: true,
        }),
        Err(_) => Err(ValidationError::InvalidUrl),
    }
}

pub fn validate(method: &str, url: &str) -> Result<ValidatedRequest, ValidationError> {
    let method = validate_method(method)?;
    let url = validate_url(url)?;
    Ok(ValidatedRequest { method, url })
}
