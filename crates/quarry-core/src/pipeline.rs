//! Pipeline vocabulary shared by the application and front-ends.

use serde::{Deserialize, Serialize};

/// Which report flow to run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum PipelineMode {
    /// Plan lines become sections; each section is searched and written separately.
    #[default]
    #[serde(rename = "sectioned")]
    #[strum(serialize = "sectioned")]
    Sectioned,
    /// Plan with queries, model-extracted query list, one 7-part report.
    #[serde(rename = "agents", alias = "multi-agent")]
    #[strum(serialize = "agents", serialize = "multi-agent")]
    MultiAgent,
}

/// One step of the pipeline, used to name failures and progress events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
pub enum PipelineStage {
    Planner,
    QueryExtractor,
    SectionResearcher,
    Writer,
    Refiner,
    ReportAssembler,
    Export,
}
