//! Proxied request execution with timing and history recording.
//!
//! Every call, success or failure, is appended to the history store before
//! the outcome is handed back to the caller.

use super::response_builder::{build_failure, build_success};
use super::service::{is_sendable_header, ProxyService};
use super::types::{ExecutionReport, Outcome};
use crate::compose::EffectiveRequest;
use crate::error::StoreError;
use crate::history::{with_store, NewRecord, SharedStore};
use crate::shared::DetailedTiming;
use std::sync::Arc;

pub struct RequestExecutor {
    proxy: Arc<dyn ProxyService>,
    store: SharedStore,
}

impl RequestExecutor {
    pub fn new(proxy: Arc<dyn ProxyService>, store: SharedStore) -> Self {
        Self { proxy, store }
    }

    /// Sends `request` once, records the attempt and returns its outcome.
    ///
    /// Transport failures are part of the returned outcome. The only error
    /// is a failed append, in which case the outcome is lost to the caller.
    pub async fn execute(&self, mut request: EffectiveRequest) -> Result<ExecutionReport, StoreError> {
        // Dispatch and record the same header set.
        request.headers.retain(|name, value| {
            let sendable = is_sendable_header(name, value);
            if !sendable {
                tracing::warn!(header = %name, "Skipping invalid request header");
            }
            sendable
        });

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Proxying request"
        );

        let mut timing = DetailedTiming::new();
        let outcome = match self.proxy.dispatch(&request, &mut timing).await {
            Ok(remote) => build_success(remote, &mut timing),
            Err(failure) => build_failure(failure, &mut timing),
        };

        match &outcome {
            Outcome::Success(s) => tracing::debug!(
                status = s.status,
                elapsed_ms = s.response_time_ms,
                size = s.response_size_bytes,
                "Request completed"
            ),
            Outcome::Failure(f) => tracing::warn!(
                code = f.code,
                message = %f.message,
                elapsed_ms = f.response_time_ms,
                "Request failed"
            ),
        }

        let record = history_record(&request, &outcome);
        let stored = with_store(&self.store, move |store| store.append(record)).await?;

        Ok(ExecutionReport {
            id: stored.id,
            outcome,
        })
    }
}

/// The history entry for one attempt. GET requests never record a body.
pub fn history_record(request: &EffectiveRequest, outcome: &Outcome) -> NewRecord {
    let (response_status, response_size_bytes, response_body) = match outcome {
        Outcome::Success(s) => (s.status, Some(s.response_size_bytes), s.body.clone()),
        Outcome::Failure(f) => (f.recorded_status(), None, f.error_body()),
    };

    NewRecord {
        method: request.method,
        url: request.url.clone(),
        headers: request.headers.clone(),
        request_body: request.outbound_body().cloned(),
        response_status,
        response_time_ms: outcome.response_time_ms(),
        response_size_bytes,
        response_body,
    }
}
