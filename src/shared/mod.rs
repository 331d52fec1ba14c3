//! Shared utilities used across the proxy and history layers.

pub mod timing;

pub use timing::DetailedTiming;
