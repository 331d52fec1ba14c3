use crate::compose::HttpMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One stored execution attempt. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: i64,
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    pub response_status: u16,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size_bytes: Option<u64>,
    pub response_body: Value,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied part of a record; the store adds `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub request_body: Option<Value>,
    pub response_status: u16,
    pub response_time_ms: u64,
    pub response_size_bytes: Option<u64>,
    pub response_body: Value,
}

impl NewRecord {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> RequestRecord {
        RequestRecord {
            id,
            method: self.method,
            url: self.url,
            headers: self.headers,
            request_body: self.request_body,
            response_status: self.response_status,
            response_time_ms: self.response_time_ms,
            response_size_bytes: self.response_size_bytes,
            response_body: self.response_body,
            created_at,
        }
    }
}

/// Page selection plus optional filters for a history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    /// 1-indexed.
    pub page: u32,
    pub limit: u32,
    /// Case-sensitive URL substring.
    pub search: Option<String>,
    /// Exact method match.
    pub method: Option<String>,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            method: None,
        }
    }
}

impl HistoryFilter {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Search term, or `None` when absent or empty.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn method_filter(&self) -> Option<&str> {
        self.method.as_deref().filter(|m| !m.is_empty())
    }
}

/// One page of records and the size of the filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<RequestRecord>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(filter: &HistoryFilter, total_items: u64) -> Self {
        let limit = filter.limit();
        Self {
            page: filter.page(),
            limit,
            total_items,
            total_pages: total_items.div_ceil(u64::from(limit)),
        }
    }
}
