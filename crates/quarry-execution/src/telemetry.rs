//! Global tracing subscriber setup.

use quarry_core::{QuarryError, Result};
use tracing_subscriber::filter::{EnvFilter, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::tracing_layer::PipelineEventLayer;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "quarry=info";

/// Set to `1` for JSON log lines.
pub const LOG_JSON_ENV: &str = "QUARRY_LOG_JSON";

pub struct TracingOptions {
    /// Directive used when `RUST_LOG` is unset
    pub default_filter: String,
    pub json: bool,
    /// Forward stage events to a front-end
    pub events: Option<PipelineEventLayer>,
}

impl TracingOptions {
    /// Reads `QUARRY_LOG_JSON` from the environment.
    pub fn from_env() -> Self {
        Self {
            default_filter: DEFAULT_LOG_FILTER.to_string(),
            json: std::env::var(LOG_JSON_ENV).ok().as_deref() == Some("1"),
            events: None,
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_events(mut self, layer: PipelineEventLayer) -> Self {
        self.events = Some(layer);
        self
    }
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Installs the global subscriber: stderr logs filtered by `RUST_LOG`, plus
/// the optional pipeline event layer.
///
/// The event layer has its own filter so status lines keep flowing when
/// `RUST_LOG` silences the log output.
pub fn init_tracing(options: TracingOptions) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.default_filter))
        .map_err(|e| QuarryError::configuration(format!("Invalid log filter: {e}")))?;

    let (plain, json) = if options.json {
        (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            ),
        )
    } else {
        (
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            ),
            None,
        )
    };

    let events = options.events.map(|layer| {
        layer.with_filter(filter_fn(|metadata| metadata.target().starts_with("quarry")))
    });

    tracing_subscriber::registry()
        .with(plain)
        .with(json)
        .with(events)
        .try_init()
        .map_err(|e| QuarryError::internal(format!("Tracing already initialized: {e}")))
}
