//! Application layer for Quarry.
//!
//! Pipeline stages, the prompts they send, the end-to-end
//! [`ResearchPipeline`] and the per-session [`ReportSessionUsecase`].

pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod query_extractor;
pub mod refiner;
pub mod report_assembler;
pub mod report_session_usecase;
pub mod section_researcher;
pub mod session;
pub mod writer;

pub use pipeline::{GeneratedReport, PartialReport, ResearchPipeline, StageFailure};
pub use planner::{PlanOutline, Planner};
pub use query_extractor::{Extraction, ExtractionSource, QueryExtractor, ResearchTarget};
pub use refiner::Refiner;
pub use report_assembler::{AssembledReport, ReportAssembler, ReportSection, dedupe_sources};
pub use report_session_usecase::ReportSessionUsecase;
pub use section_researcher::SectionResearcher;
pub use session::SessionRegistry;
pub use writer::{Writer, missing_sections};
