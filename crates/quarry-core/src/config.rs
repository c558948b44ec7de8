//! Configuration models.
//!
//! Two files back these types: `secret.json` (provider API keys) and
//! `config.toml` (pipeline tuning). Loading lives in `quarry-infrastructure`.

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::pipeline::PipelineMode;

pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://google.serper.dev";

/// Upper bound accepted for `max_queries` and `results_per_query`.
pub const MAX_FAN_OUT: usize = 10;

// ============================================================================
// Secrets
// ============================================================================

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub groq: Option<GroqConfig>,
    #[serde(default)]
    pub serper: Option<SerperConfig>,
}

/// Completion provider (Groq, OpenAI-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Search provider (Serper) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperConfig {
    pub api_key: String,
}

/// Resolved provider credentials.
///
/// Both keys are required; construction fails with
/// [`QuarryError::Configuration`] otherwise.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub completion_api_key: String,
    pub search_api_key: String,
    pub model_override: Option<String>,
}

impl Credentials {
    pub fn new(
        completion_api_key: Option<String>,
        search_api_key: Option<String>,
        model_override: Option<String>,
    ) -> Result<Self> {
        let completion_api_key = non_blank(completion_api_key)
            .ok_or_else(|| QuarryError::configuration("GROQ_API_KEY is not configured"))?;
        let search_api_key = non_blank(search_api_key)
            .ok_or_else(|| QuarryError::configuration("SERPER_API_KEY is not configured"))?;

        Ok(Self {
            completion_api_key,
            search_api_key,
            model_override: non_blank(model_override),
        })
    }
}

// Keys stay out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("completion_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .field("model_override", &self.model_override)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Pipeline tuning
// ============================================================================

/// Sampling parameters for one completion-backed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSampling {
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl StageSampling {
    pub fn new(temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Tuning knobs for the research pipeline, read from the `[pipeline]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    pub model: String,
    pub completion_base_url: String,
    pub search_base_url: String,
    /// Cap on the number of queries researched per report
    pub max_queries: usize,
    /// Search results kept per query
    pub results_per_query: usize,
    /// Research all queries concurrently instead of one after another
    pub parallel_research: bool,
    pub search_timeout_secs: u64,
    /// No timeout on completion calls when unset
    pub completion_timeout_secs: Option<u64>,
    pub planner: StageSampling,
    pub extractor: StageSampling,
    pub writer: StageSampling,
    pub refiner: StageSampling,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            completion_base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            max_queries: 5,
            results_per_query: 5,
            parallel_research: false,
            search_timeout_secs: 15,
            completion_timeout_secs: None,
            planner: StageSampling::new(0.5, Some(1024)),
            extractor: StageSampling::new(0.2, Some(256)),
            writer: StageSampling::new(0.3, Some(4096)),
            refiner: StageSampling::new(0.3, Some(4096)),
        }
    }
}

impl PipelineConfig {
    /// Checks ranges. Called once at startup so bad values fail fast.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FAN_OUT).contains(&self.max_queries) {
            return Err(QuarryError::configuration(format!(
                "max_queries must be between 1 and {MAX_FAN_OUT}, got {}",
                self.max_queries
            )));
        }
        if !(1..=MAX_FAN_OUT).contains(&self.results_per_query) {
            return Err(QuarryError::configuration(format!(
                "results_per_query must be between 1 and {MAX_FAN_OUT}, got {}",
                self.results_per_query
            )));
        }
        if self.search_timeout_secs == 0 {
            return Err(QuarryError::configuration(
                "search_timeout_secs must be greater than zero",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(QuarryError::configuration("model must not be empty"));
        }
        for (name, sampling) in [
            ("planner", &self.planner),
            ("extractor", &self.extractor),
            ("writer", &self.writer),
            ("refiner", &self.refiner),
        ] {
            if !(0.0..=1.0).contains(&sampling.temperature) {
                return Err(QuarryError::configuration(format!(
                    "{name}.temperature must be within [0, 1], got {}",
                    sampling.temperature
                )));
            }
        }
        Ok(())
    }

    /// Applies a model name coming from credentials (secret.json or env).
    pub fn with_model_override(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model {
            self.model = model.to_string();
        }
        self
    }
}

/// Root structure of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
}
