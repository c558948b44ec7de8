//! Report session use case.
//!
//! `ReportSessionUsecase` is the entry point front-ends talk to. It owns the
//! pipeline, the refiner and the exporter, and keeps one [`SessionState`] per
//! session in a [`SessionRegistry`] so concurrent users never share state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use quarry_core::config::PipelineConfig;
use quarry_core::{
    CompletionClient, PipelineMode, QuarryError, Result, SearchClient, SessionState,
};
use quarry_infrastructure::PdfExporter;
use tokio::task;
use uuid::Uuid;

use crate::pipeline::{GeneratedReport, ResearchPipeline, StageFailure};
use crate::refiner::Refiner;
use crate::session::SessionRegistry;

pub struct ReportSessionUsecase {
    /// Runs Planner through ReportAssembler
    pipeline: Arc<ResearchPipeline>,
    refiner: Arc<Refiner>,
    exporter: PdfExporter,
    /// One state per session ID
    registry: Arc<SessionRegistry>,
}

impl ReportSessionUsecase {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        search: Arc<dyn SearchClient>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(ResearchPipeline::new(completion.clone(), search, config)),
            refiner: Arc::new(Refiner::new(completion, config.refiner.clone())),
            exporter: PdfExporter::default(),
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    /// Starts a new empty session and returns its ID.
    pub async fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.registry.get_or_create(&session_id).await;
        tracing::debug!(%session_id, "[Session] Created");
        session_id
    }

    /// Runs the full pipeline and records the result in the session.
    ///
    /// On failure the session is not touched.
    pub async fn generate(
        &self,
        session_id: &str,
        topic: &str,
        mode: PipelineMode,
    ) -> std::result::Result<GeneratedReport, StageFailure> {
        let session = self.registry.get_or_create(session_id).await;
        let generated = self.pipeline.run(topic, mode).await?;

        let mut state = session.lock().await;
        state.record_generation(generated.topic.clone(), generated.text());
        tracing::info!(
            %session_id,
            entries = state.history().len(),
            "[Session] Report recorded"
        );
        Ok(generated)
    }

    /// Refines the session's current report.
    pub async fn refine(&self, session_id: &str, instruction: &str) -> Result<String> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;
        self.refiner.refine_session(&mut state, instruction).await
    }

    /// Copy of the session's state.
    pub async fn snapshot(&self, session_id: &str) -> Result<SessionState> {
        let session = self.session(session_id).await?;
        let state = session.lock().await;
        Ok(state.clone())
    }

    /// Renders the session's current report to PDF bytes.
    pub async fn render_pdf(&self, session_id: &str) -> Result<Vec<u8>> {
        let report = self.current_report(session_id).await?;
        let exporter = self.exporter.clone();

        task::spawn_blocking(move || exporter.render(&report))
            .await
            .map_err(|e| QuarryError::io(format!("Failed to spawn blocking task: {e}")))?
    }

    /// Writes the session's current report as a PDF file and returns its path.
    pub async fn export_pdf(&self, session_id: &str, path: &Path) -> Result<PathBuf> {
        let report = self.current_report(session_id).await?;
        let exporter = self.exporter.clone();
        let target = path.to_path_buf();

        task::spawn_blocking(move || exporter.write_to(&report, &target))
            .await
            .map_err(|e| QuarryError::io(format!("Failed to spawn blocking task: {e}")))??;
        Ok(path.to_path_buf())
    }

    pub async fn close_session(&self, session_id: &str) {
        self.registry.remove(session_id).await;
    }

    async fn current_report(&self, session_id: &str) -> Result<String> {
        let session = self.session(session_id).await?;
        let state = session.lock().await;
        state
            .current_report()
            .map(str::to_string)
            .ok_or_else(|| QuarryError::invalid_input("No report to export yet; generate one first"))
    }

    async fn session(
        &self,
        session_id: &str,
    ) -> Result<Arc<tokio::sync::Mutex<SessionState>>> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| QuarryError::invalid_input(format!("Unknown session: {session_id}")))
    }
}
