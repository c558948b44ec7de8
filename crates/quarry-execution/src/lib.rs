//! Runtime plumbing shared by the Quarry binaries.

pub mod bootstrap;
pub mod telemetry;
pub mod tracing_layer;

pub use bootstrap::QuarryRuntime;
pub use telemetry::{DEFAULT_LOG_FILTER, TracingOptions, init_tracing};
pub use tracing_layer::{PipelineEvent, PipelineEventLayer};
