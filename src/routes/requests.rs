use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::compose::{validate_method, validate_url, EffectiveRequest};
use crate::error::{AppError, StoreError, ValidationError};
use crate::proxy::{ExecutionReport, Outcome, SendFailureBody, SendRequest, SendSuccessBody};

/// Validates the payload, proxies it and replies once the attempt is recorded.
///
/// The dispatch and append run on their own task, so a caller that goes away
/// mid-flight still leaves a history record behind.
pub async fn send_request(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let url = payload
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(ValidationError::UrlRequired)?;
    let url = validate_url(url)?;
    let method = payload
        .method
        .as_deref()
        .ok_or(ValidationError::InvalidMethod)
        .and_then(validate_method)?;

    if url.was_rewritten {
        tracing::debug!(url = %url.normalized_url, "Prefixed URL with http://");
    }

    let request = EffectiveRequest::new(
        method,
        url.normalized_url,
        payload.headers.unwrap_or_default(),
        payload.body,
    );

    let executor = state.executor.clone();
    let report = tokio::spawn(async move { executor.execute(request).await })
        .await
        .unwrap_or_else(|e| Err(StoreError::Join(e.to_string())))
        .map_err(|e| AppError::store("Failed to record request", e))?;

    Ok(render(report))
}

fn render(report: ExecutionReport) -> Response {
    match report.outcome {
        Outcome::Success(s) => (
            StatusCode::OK,
            Json(SendSuccessBody {
                data: s.body,
                status: s.status,
                headers: s.headers,
                response_time: s.response_time_ms,
                response_size: s.response_size_bytes,
                timing: s.timing,
                id: report.id,
            }),
        )
            .into_response(),
        Outcome::Failure(f) => {
            let status = f
                .status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(SendFailureBody {
                    error: f.message,
                    code: f.code.to_string(),
                    status: f.status,
                    response_time: f.response_time_ms,
                    id: report.id,
                }),
            )
                .into_response()
        }
    }
}
