//! Accumulated research context.

use serde::{Deserialize, Serialize};

use crate::search::{QueryOutcome, Source};

/// What one query (or section) of research produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFinding {
    /// Section title or extracted query this finding belongs to
    pub label: String,
    /// The exact string sent to the search provider
    pub query: String,
    pub outcome: QueryOutcome,
}

impl SectionFinding {
    pub fn new(label: impl Into<String>, query: impl Into<String>, outcome: QueryOutcome) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
            outcome,
        }
    }

    /// Result lines formatted as `"{title}: {snippet}"`, newline separated.
    ///
    /// Empty when nothing was found or search was unavailable.
    pub fn snippet_block(&self) -> String {
        self.outcome
            .results()
            .iter()
            .map(|r| r.to_context_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn sources(&self) -> Vec<Source> {
        self.outcome.results().iter().map(|r| r.source()).collect()
    }

    /// Snippet block, or a marker line saying why there is none.
    pub fn to_prompt_block(&self) -> String {
        match &self.outcome {
            QueryOutcome::Found(_) => self.snippet_block(),
            QueryOutcome::NoResults => "[No search results found for this query]".to_string(),
            QueryOutcome::Unavailable { reason } => {
                format!("[Search unavailable for this query: {reason}]")
            }
        }
    }
}

/// Ordered findings plus every source contributed so far.
///
/// Sources are append-only; duplicates are kept until the report is
/// assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchContext {
    findings: Vec<SectionFinding>,
    sources: Vec<Source>,
}

impl ResearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: SectionFinding) {
        self.sources.extend(finding.sources());
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[SectionFinding] {
        &self.findings
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of queries whose search call failed.
    pub fn unavailable_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.outcome.is_unavailable())
            .count()
    }

    /// Renders every finding as a labeled block for the writer prompt.
    pub fn to_prompt_text(&self) -> String {
        self.findings
            .iter()
            .map(|f| format!("### {}\n{}", f.label, f.to_prompt_block()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
