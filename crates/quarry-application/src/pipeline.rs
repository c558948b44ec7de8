//! End-to-end report generation.
//!
//! Stages run strictly in order: Planner, QueryExtractor, SectionResearcher,
//! Writer, ReportAssembler. Progress is reported through tracing events that
//! carry `stage` and `status` fields; front-ends subscribe with a tracing
//! layer. A stage failure stops the run and returns everything produced so
//! far in a [`PartialReport`].

use std::sync::Arc;

use quarry_core::config::PipelineConfig;
use quarry_core::{
    CompletionClient, PipelineMode, PipelineStage, QuarryError, ResearchContext, SearchClient,
};
use serde::Serialize;

use crate::planner::{PlanOutline, Planner};
use crate::query_extractor::{Extraction, QueryExtractor, ResearchTarget};
use crate::report_assembler::{AssembledReport, ReportAssembler, ReportSection};
use crate::section_researcher::SectionResearcher;
use crate::writer::{Writer, missing_sections};

/// Whatever a failed run had produced before the failing stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialReport {
    pub plan: Option<PlanOutline>,
    pub targets: Vec<ResearchTarget>,
    pub context: Option<ResearchContext>,
    pub sections: Vec<ReportSection>,
}

/// A stage failed; earlier results are kept in `partial`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: QuarryError,
    pub partial: PartialReport,
}

/// A successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedReport {
    pub topic: String,
    pub mode: PipelineMode,
    pub plan: PlanOutline,
    pub targets: Vec<ResearchTarget>,
    pub context: ResearchContext,
    pub report: AssembledReport,
    /// Template sections the writer left out (multi-agent mode only)
    pub missing_sections: Vec<&'static str>,
}

impl GeneratedReport {
    pub fn text(&self) -> &str {
        &self.report.text
    }
}

pub struct ResearchPipeline {
    planner: Planner,
    extractor: QueryExtractor,
    researcher: SectionResearcher,
    writer: Writer,
    assembler: ReportAssembler,
    parallel_research: bool,
}

impl ResearchPipeline {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        search: Arc<dyn SearchClient>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            planner: Planner::new(completion.clone(), config.planner.clone(), config.max_queries),
            extractor: QueryExtractor::new(
                completion.clone(),
                config.extractor.clone(),
                config.max_queries,
            ),
            researcher: SectionResearcher::new(search, config.results_per_query),
            writer: Writer::new(completion, config.writer.clone()),
            assembler: ReportAssembler::new(),
            parallel_research: config.parallel_research,
        }
    }

    pub fn with_parallel_research(mut self, parallel: bool) -> Self {
        self.parallel_research = parallel;
        self
    }

    /// Runs every stage for `topic`.
    pub async fn run(&self, topic: &str, mode: PipelineMode) -> Result<GeneratedReport, StageFailure> {
        let topic = topic.trim();
        let mut partial = PartialReport::default();
        tracing::info!(%mode, "[Pipeline] Generating report on {:?}", topic);

        // Planner
        stage_started(PipelineStage::Planner);
        let plan = match self.planner.plan(topic, mode).await {
            Ok(plan) => plan,
            Err(error) => return Err(fail(PipelineStage::Planner, error, partial)),
        };
        tracing::info!(
            stage = %PipelineStage::Planner,
            status = "completed",
            plan = plan.as_str(),
            "[Planner] Plan ready"
        );
        partial.plan = Some(plan.clone());

        // QueryExtractor
        stage_started(PipelineStage::QueryExtractor);
        let extraction: Extraction = match mode {
            PipelineMode::Sectioned => self.extractor.from_outline(topic, &plan),
            PipelineMode::MultiAgent => self.extractor.extract(topic, &plan).await,
        };
        tracing::info!(
            stage = %PipelineStage::QueryExtractor,
            status = "completed",
            source = %extraction.source,
            queries = ?extraction.queries(),
            "[QueryExtractor] {} queries",
            extraction.targets.len()
        );
        let targets = extraction.targets;
        partial.targets = targets.clone();

        // SectionResearcher
        stage_started(PipelineStage::SectionResearcher);
        let context = self.researcher.research_all(&targets, self.parallel_research).await;
        tracing::info!(
            stage = %PipelineStage::SectionResearcher,
            status = "completed",
            sources = context.sources().len(),
            unavailable = context.unavailable_count(),
            "[SectionResearcher] Research finished"
        );
        partial.context = Some(context.clone());

        // Writer
        stage_started(PipelineStage::Writer);
        let mut missing = Vec::new();
        match mode {
            PipelineMode::Sectioned => {
                for finding in context.findings() {
                    match self.writer.write_section(topic, finding).await {
                        Ok(body) => {
                            tracing::info!(
                                stage = %PipelineStage::Writer,
                                status = "progress",
                                section = %finding.label,
                                "[Writer] Section written"
                            );
                            partial.sections.push(ReportSection::titled(finding.label.clone(), body));
                        }
                        Err(error) => return Err(fail(PipelineStage::Writer, error, partial)),
                    }
                }
            }
            PipelineMode::MultiAgent => match self.writer.write_report(topic, &context).await {
                Ok(body) => {
                    missing = missing_sections(&body);
                    partial.sections.push(ReportSection::untitled(body));
                }
                Err(error) => return Err(fail(PipelineStage::Writer, error, partial)),
            },
        }
        tracing::info!(stage = %PipelineStage::Writer, status = "completed", "[Writer] Draft complete");

        // ReportAssembler
        stage_started(PipelineStage::ReportAssembler);
        let report = self
            .assembler
            .assemble(topic, partial.sections.clone(), context.sources());
        tracing::info!(
            stage = %PipelineStage::ReportAssembler,
            status = "completed",
            references = report.references.len(),
            "[ReportAssembler] Report ready"
        );

        Ok(GeneratedReport {
            topic: topic.to_string(),
            mode,
            plan,
            targets,
            context,
            report,
            missing_sections: missing,
        })
    }
}

fn stage_started(stage: PipelineStage) {
    tracing::info!(stage = %stage, status = "started", "[{}] Started", stage);
}

fn fail(stage: PipelineStage, error: QuarryError, partial: PartialReport) -> StageFailure {
    tracing::error!(
        stage = %stage,
        status = "failed",
        error = %error,
        "[{}] Failed",
        stage
    );
    StageFailure {
        stage,
        error,
        partial,
    }
}
