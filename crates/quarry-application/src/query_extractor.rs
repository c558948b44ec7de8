//! QueryExtractor stage: plan outline in, list of search targets out.
//!
//! Two strategies exist. The outline strategy uses plan lines directly and
//! never calls a model. The model strategy asks for a comma-separated list
//! and parses it leniently, falling back to the plan's own query block, then
//! the outline lines, then the bare topic. The result is never empty.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use quarry_core::config::StageSampling;
use quarry_core::{CompletionClient, CompletionRequest, QuarryError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::planner::PlanOutline;
use crate::prompts;

/// Pieces longer than this are prose, not queries.
const MAX_QUERY_CHARS: usize = 200;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,2}[.)\]]\s+|[-*•+]\s+)").expect("list marker pattern is valid")
});

/// A search to run, and the section it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchTarget {
    /// Section title (outline strategy) or the query itself (model strategy)
    pub label: String,
    /// String sent to the search provider
    pub query: String,
}

impl ResearchTarget {
    pub fn new(label: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
        }
    }

    /// Target whose label and query are the same string.
    pub fn query(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            label: query.clone(),
            query,
        }
    }
}

/// Where the final target list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ExtractionSource {
    Model,
    PlanQueryBlock,
    OutlineLines,
    Topic,
}

/// Output of extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub targets: Vec<ResearchTarget>,
    pub source: ExtractionSource,
}

impl Extraction {
    pub fn queries(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.query.as_str()).collect()
    }
}

/// Parses a raw model reply into at most `max` queries.
///
/// Splits on commas and newlines, strips list markers, brackets and quotes,
/// and drops blanks, label lines and case-insensitive duplicates. Fails with
/// [`QuarryError::MalformedQueryList`] when nothing usable remains.
pub fn parse_query_list(raw: &str, max: usize) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for piece in raw.split([',', '\n']) {
        let Some(query) = clean_query(piece) else {
            continue;
        };
        if seen.insert(query.to_lowercase()) {
            queries.push(query);
        }
        if queries.len() >= max {
            break;
        }
    }

    if queries.is_empty() {
        return Err(QuarryError::MalformedQueryList(format!(
            "no usable queries in reply: {:?}",
            truncate(raw, 80)
        )));
    }
    Ok(queries)
}

fn clean_query(piece: &str) -> Option<String> {
    let is_noise = |c: char| c.is_whitespace() || matches!(c, '[' | ']' | '"' | '\'' | '*' | '`');

    let trimmed = piece.trim_matches(is_noise);
    let unnumbered = LIST_MARKER.replace(trimmed, "");
    let query = unnumbered.trim_matches(is_noise);

    if query.is_empty() || query.ends_with(':') || query.chars().count() > MAX_QUERY_CHARS {
        return None;
    }
    Some(query.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Turns a plan into search targets.
pub struct QueryExtractor {
    client: Arc<dyn CompletionClient>,
    sampling: StageSampling,
    max_queries: usize,
}

impl QueryExtractor {
    pub fn new(client: Arc<dyn CompletionClient>, sampling: StageSampling, max_queries: usize) -> Self {
        Self {
            client,
            sampling,
            max_queries: max_queries.max(1),
        }
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    /// Outline strategy: each plan line is a section searched as `"{topic} {line}"`.
    pub fn from_outline(&self, topic: &str, plan: &PlanOutline) -> Extraction {
        let topic = topic.trim();
        let targets: Vec<_> = plan
            .section_lines()
            .into_iter()
            .take(self.max_queries)
            .map(|line| {
                let query = format!("{topic} {line}");
                ResearchTarget::new(line, query)
            })
            .collect();

        if targets.is_empty() {
            tracing::warn!("[QueryExtractor] Plan has no usable lines, researching the topic itself");
            return topic_only(topic);
        }
        Extraction {
            targets,
            source: ExtractionSource::OutlineLines,
        }
    }

    /// Model strategy with fallbacks. Never fails.
    pub async fn extract(&self, topic: &str, plan: &PlanOutline) -> Extraction {
        match self.request_queries(plan).await {
            Ok(queries) => {
                return Extraction {
                    targets: queries.into_iter().map(ResearchTarget::query).collect(),
                    source: ExtractionSource::Model,
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "[QueryExtractor] Falling back from model query list");
            }
        }

        let block = plan.search_query_lines().join("\n");
        if let Ok(queries) = parse_query_list(&block, self.max_queries) {
            return Extraction {
                targets: queries.into_iter().map(ResearchTarget::query).collect(),
                source: ExtractionSource::PlanQueryBlock,
            };
        }

        self.from_outline(topic, plan)
    }

    async fn request_queries(&self, plan: &PlanOutline) -> Result<Vec<String>> {
        let request = CompletionRequest::from_prompts(
            prompts::EXTRACTOR_SYSTEM,
            prompts::extractor_prompt(plan.as_str(), self.max_queries),
        )
        .with_sampling(&self.sampling);

        let raw = self.client.complete(request).await?;
        parse_query_list(&raw, self.max_queries)
    }
}

fn topic_only(topic: &str) -> Extraction {
    Extraction {
        targets: vec![ResearchTarget::query(topic)],
        source: ExtractionSource::Topic,
    }
}
