//! HTTP provider clients for the completion and search boundaries.

pub mod groq_api_client;
pub mod serper_search_client;

pub use groq_api_client::GroqApiClient;
pub use serper_search_client::SerperSearchClient;
