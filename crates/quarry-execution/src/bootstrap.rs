//! Wires configuration, credentials and provider clients into a ready
//! [`ReportSessionUsecase`].

use std::path::PathBuf;
use std::sync::Arc;

use quarry_application::ReportSessionUsecase;
use quarry_core::config::{Credentials, PipelineConfig};
use quarry_core::{CompletionClient, QuarryError, Result, SearchClient};
use quarry_infrastructure::{ConfigStorage, QuarryPaths, resolve_credentials};
use quarry_interaction::{GroqApiClient, SerperSearchClient};

/// Everything a front-end needs to run reports.
pub struct QuarryRuntime {
    pub config: PipelineConfig,
    pub config_path: PathBuf,
    pub usecase: Arc<ReportSessionUsecase>,
}

impl QuarryRuntime {
    /// Loads config.toml and credentials, then builds the provider clients.
    ///
    /// Fails with [`QuarryError::Configuration`] when an API key is missing
    /// or a config value is out of range.
    pub fn load() -> Result<Self> {
        Self::load_with(|_| {})
    }

    /// Like [`QuarryRuntime::load`], letting the caller override config values
    /// (e.g. from command-line flags) before validation.
    pub fn load_with(adjust: impl FnOnce(&mut PipelineConfig)) -> Result<Self> {
        let config_path =
            QuarryPaths::config_file().map_err(|e| QuarryError::configuration(e.to_string()))?;
        let app_config = ConfigStorage::new(config_path.clone()).load()?;
        let credentials = resolve_credentials()?;

        let mut config = app_config
            .pipeline
            .with_model_override(credentials.model_override.as_deref());
        adjust(&mut config);
        config.validate()?;

        let mut runtime = Self::from_credentials(config, &credentials)?;
        runtime.config_path = config_path;
        Ok(runtime)
    }

    pub fn from_credentials(config: PipelineConfig, credentials: &Credentials) -> Result<Self> {
        let completion: Arc<dyn CompletionClient> =
            Arc::new(GroqApiClient::from_config(credentials, &config)?);
        let search: Arc<dyn SearchClient> =
            Arc::new(SerperSearchClient::from_config(credentials, &config)?);

        tracing::info!(
            model = completion.model(),
            mode = %config.mode,
            max_queries = config.max_queries,
            "[Runtime] Providers ready"
        );
        Ok(Self::from_clients(config, completion, search))
    }

    /// Builds the runtime around already constructed clients.
    pub fn from_clients(
        config: PipelineConfig,
        completion: Arc<dyn CompletionClient>,
        search: Arc<dyn SearchClient>,
    ) -> Self {
        let usecase = ReportSessionUsecase::new(completion, search, &config);
        Self {
            config,
            config_path: PathBuf::new(),
            usecase: Arc::new(usecase),
        }
    }
}
