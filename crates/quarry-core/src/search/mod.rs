//! Web search boundary.
//!
//! The search provider is treated as a black box that maps a query string to
//! ranked `(title, link, snippet)` hits.

pub mod model;
pub mod service;

pub use model::{QueryOutcome, SearchResult, Source};
pub use service::SearchClient;
