pub mod executor;
pub mod response_builder;
pub mod service;
pub mod types;

pub use executor::{history_record, RequestExecutor};
pub use response_builder::{build_failure, build_success, decode_body, is_binary_content, serialized_size};
pub use service::{is_sendable_header, DispatchFuture, HttpProxyService, ProxyService};
pub use types::*;
