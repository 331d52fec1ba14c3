//! Proxy service abstraction layer.
//!
//! Provides a trait-based abstraction over the outbound HTTP transport,
//! so the executor can be driven by a fake in tests.

use super::types::{RemoteResponse, TransportFailure};
use crate::compose::{EffectiveRequest, HttpMethod};
use crate::shared::DetailedTiming;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashMap;
use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type DispatchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RemoteResponse, TransportFailure>> + Send + 'a>>;

/// Trait for transports that send one request to its origin.
pub trait ProxyService: Send + Sync {
    /// Sends `request` and reads the full response.
    ///
    /// Any status code the remote returns is a success here. Only failing to
    /// complete the exchange yields a `TransportFailure`. Implementations
    /// mark the request, first-byte and download phases on `timing`.
    fn dispatch<'a>(
        &'a self,
        request: &'a EffectiveRequest,
        timing: &'a mut DetailedTiming,
    ) -> DispatchFuture<'a>;
}

/// reqwest-backed transport with a fixed whole-call timeout.
#[derive(Clone)]
pub struct HttpProxyService {
    client: reqwest::Client,
}

impl HttpProxyService {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ProxyService for HttpProxyService {
    fn dispatch<'a>(
        &'a self,
        request: &'a EffectiveRequest,
        timing: &'a mut DetailedTiming,
    ) -> DispatchFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(to_reqwest_method(request.method), &request.url);

            for (key, value) in &request.headers {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    builder = builder.header(name, value);
                }
            }

            if let Some(body) = request.outbound_body() {
                builder = builder.json(body);
            }

            timing.start_request();
            let response = builder.send().await.map_err(classify_error)?;
            timing.mark_ttfb();

            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());

            timing.start_download();
            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| {
                    let code = if e.is_timeout() { "TIMEOUT" } else { "BODY_READ_ERROR" };
                    TransportFailure::new(code, describe(&e)).with_status(status)
                })?
                .to_vec();
            timing.end_download();

            Ok(RemoteResponse {
                status,
                headers,
                body_bytes,
            })
        })
    }
}

/// Whether `name: value` can go on the wire as an HTTP header.
pub fn is_sendable_header(name: &str, value: &str) -> bool {
    HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok()
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Flattens response headers; repeated names are joined with `", "`.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("").to_string();
        out.entry(name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

fn classify_error(e: reqwest::Error) -> TransportFailure {
    let code = if e.is_timeout() {
        "TIMEOUT"
    } else if e.is_connect() {
        "CONNECTION_FAILED"
    } else if e.is_request() || e.is_builder() {
        "REQUEST_ERROR"
    } else {
        "REQUEST_FAILED"
    };
    let failure = TransportFailure::new(code, describe(&e));
    match e.status() {
        Some(status) => failure.with_status(status.as_u16()),
        None => failure,
    }
}

/// reqwest's top-level message plus its source chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn describe(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
