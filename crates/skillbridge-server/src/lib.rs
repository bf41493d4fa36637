//! HTTP boundary adapter: the audit read surface consumed by dashboards.

pub mod http;

pub use http::{cors_layer, router, serve};
