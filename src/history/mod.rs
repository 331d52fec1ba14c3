//! Request history: the append-only record store and its paginated query.

pub mod store;
pub mod types;

pub use store::{with_store, HistoryStore, SharedStore, SqliteHistoryStore};
pub use types::{
    HistoryFilter, HistoryPage, NewRecord, Pagination, RequestRecord, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
