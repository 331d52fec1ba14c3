use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;
use crate::history::{with_store, HistoryFilter, Pagination, RequestRecord, DEFAULT_PAGE_SIZE};

/// Raw query string; unparseable numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub method: Option<String>,
}

impl HistoryParams {
    pub fn into_filter(self) -> HistoryFilter {
        HistoryFilter {
            page: parse_positive(self.page.as_deref()).unwrap_or(1),
            limit: parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE),
            search: self.search.filter(|s| !s.is_empty()),
            method: self
                .method
                .map(|m| m.trim().to_ascii_uppercase())
                .filter(|m| !m.is_empty()),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok()).filter(|v| *v > 0)
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub requests: Vec<RequestRecord>,
    pub pagination: Pagination,
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let filter = params.into_filter();
    let query = filter.clone();
    let page = with_store(&state.store, move |store| store.query(&query))
        .await
        .map_err(|e| AppError::store("Failed to fetch request history", e))?;

    Ok(Json(HistoryResponse {
        pagination: Pagination::new(&filter, page.total_count),
        requests: page.records,
    }))
}

pub async fn get_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestRecord>, AppError> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    let record = with_store(&state.store, move |store| store.get(id))
        .await
        .map_err(|e| AppError::store("Failed to fetch request details", e))?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let filter = HistoryParams::default().into_filter();
        assert_eq!(filter, HistoryFilter::default());
    }

    #[test]
    fn test_params_fall_back_on_garbage() {
        let filter = HistoryParams {
            page: Some("abc".to_string()),
            limit: Some("0".to_string()),
            search: Some(String::new()),
            method: Some(" post ".to_string()),
        }
        .into_filter();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.search, None);
        assert_eq!(filter.method.as_deref(), Some("POST"));
    }
}
