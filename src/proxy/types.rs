use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Incoming `/requests/send` payload from the frontend
#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    pub method: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Timing information, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingInfo {
    /// Dispatch to final outcome
    pub total: u64,
    /// Time to first byte (response head received)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<u64>,
    /// Body download time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<u64>,
}

/// What the remote origin sent back, before decoding.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body_bytes: Vec<u8>,
}

/// A call that never completed as an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub code: &'static str,
    pub message: String,
    /// Set when a response head arrived before the failure.
    pub status: Option<u16>,
}

impl TransportFailure {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Remote responded, with any status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySuccess {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
    pub response_time_ms: u64,
    pub response_size_bytes: u64,
    pub timing: TimingInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyFailure {
    pub status: Option<u16>,
    pub code: &'static str,
    pub message: String,
    pub response_time_ms: u64,
}

impl ProxyFailure {
    /// Status recorded in history: the remote's if known, else 500.
    pub fn recorded_status(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    /// Structured error payload stored as the response body.
    pub fn error_body(&self) -> Value {
        serde_json::json!({
            "error": self.message,
            "code": self.code,
        })
    }
}

/// Normalized result of one proxied call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ProxySuccess),
    Failure(ProxyFailure),
}

impl Outcome {
    pub fn response_time_ms(&self) -> u64 {
        match self {
            Outcome::Success(s) => s.response_time_ms,
            Outcome::Failure(f) => f.response_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// An outcome together with the id of the history record written for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub id: i64,
    pub outcome: Outcome,
}

/// `200` body for a completed proxy call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSuccessBody {
    pub data: Value,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub response_time: u64,
    pub response_size: u64,
    pub timing: TimingInfo,
    pub id: i64,
}

/// Body for a transport failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFailureBody {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub response_time: u64,
    pub id: i64,
}
