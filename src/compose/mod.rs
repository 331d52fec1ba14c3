//! Client-side request composition: URL merging, validation and form parsing.
//!
//! Nothing in here touches the network.

pub mod draft;
pub mod query;
pub mod validate;

pub use draft::{normalize_headers, parse_body, ComposedRequest, EffectiveRequest, HeaderRow, RequestDraft};
pub use query::{compose_url, split_query, QueryParam};
pub use validate::{validate, validate_method, validate_url, HttpMethod, ValidatedRequest, ValidatedUrl};
