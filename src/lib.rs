pub mod compose;
pub mod config;
pub mod error;
pub mod history;
pub mod proxy;
pub mod routes;
pub mod shared;

pub use compose::{compose_url, validate, EffectiveRequest, HttpMethod, RequestDraft};
pub use config::Config;
pub use error::{AppError, StoreError, ValidationError};
pub use history::{HistoryFilter, HistoryStore, RequestRecord, SqliteHistoryStore};
pub use proxy::{HttpProxyService, Outcome, RequestExecutor};
pub use routes::{router, AppState};
