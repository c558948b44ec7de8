//! Domain types and provider boundaries for the Quarry research pipeline.

pub mod completion;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod research;
pub mod search;
pub mod session;

// Re-export common error type
pub use error::{QuarryError, Result};

pub use completion::{ChatMessage, CompletionClient, CompletionRequest, MessageRole};
pub use pipeline::{PipelineMode, PipelineStage};
pub use research::{ResearchContext, SectionFinding};
pub use search::{QueryOutcome, SearchClient, SearchResult, Source};
pub use session::SessionState;
