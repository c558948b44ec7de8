//! Planner stage: topic in, plan outline out.

use std::sync::Arc;

use quarry_core::config::StageSampling;
use quarry_core::{CompletionClient, CompletionRequest, PipelineMode, QuarryError, Result};
use serde::{Deserialize, Serialize};

use crate::prompts;

/// Free-form plan text produced by the planner.
///
/// The text is never assumed to follow the requested format; the accessors
/// below do best-effort reads over whatever came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutline {
    text: String,
}

impl PlanOutline {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Section titles, one per non-blank line.
    ///
    /// When the plan has an `Outline:` block only that block is used. Label
    /// lines and lines ending in `:` (preambles) are skipped.
    pub fn section_lines(&self) -> Vec<String> {
        let outline = self.labeled_block("outline");
        if !outline.is_empty() {
            return outline;
        }
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !is_label_line(line) && split_label(line).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Lines of the `Search Queries:` block, if the plan has one.
    pub fn search_query_lines(&self) -> Vec<String> {
        self.labeled_block("search queries")
    }

    fn labeled_block(&self, label: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut inside = false;

        for line in self.text.lines().map(str::trim) {
            if let Some((name, rest)) = split_label(line) {
                if inside {
                    break;
                }
                if name.eq_ignore_ascii_case(label) {
                    inside = true;
                    if !rest.is_empty() {
                        lines.push(rest.to_string());
                    }
                }
                continue;
            }
            if inside && !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }
}

impl std::fmt::Display for PlanOutline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn strip_markup(line: &str) -> &str {
    line.trim_matches(|c: char| c == '*' || c == '#' || c == '_' || c.is_whitespace())
}

fn is_label_line(line: &str) -> bool {
    strip_markup(line).ends_with(':')
}

/// Recognizes `Outline:`, `**Search Queries:** a, b` and similar.
///
/// Returns the label and any text following it on the same line.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let name = strip_markup(head);
    let known = ["outline", "search queries", "structure"];
    if known.iter().any(|k| name.eq_ignore_ascii_case(k)) {
        Some((name, strip_markup(rest)))
    } else {
        None
    }
}

/// Produces the plan outline for a topic.
pub struct Planner {
    client: Arc<dyn CompletionClient>,
    sampling: StageSampling,
    max_queries: usize,
}

impl Planner {
    pub fn new(client: Arc<dyn CompletionClient>, sampling: StageSampling, max_queries: usize) -> Self {
        Self {
            client,
            sampling,
            max_queries,
        }
    }

    pub async fn plan(&self, topic: &str, mode: PipelineMode) -> Result<PlanOutline> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuarryError::invalid_input("Topic must not be empty"));
        }

        let prompt = match mode {
            PipelineMode::Sectioned => prompts::sectioned_plan_prompt(topic),
            PipelineMode::MultiAgent => prompts::agents_plan_prompt(topic, self.max_queries),
        };
        let request =
            CompletionRequest::from_prompts(prompts::PLANNER_SYSTEM, prompt).with_sampling(&self.sampling);

        tracing::debug!(model = self.client.model(), %mode, "[Planner] Requesting plan");
        let text = self.client.complete(request).await?;
        Ok(PlanOutline::new(text.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lines_skip_blank_and_preamble() {
        let plan = PlanOutline::new(
            "Here is a research plan for renewable energy:\n\n\
             1. Introduction\n\
             2. Solar Power\n\
             \n\
             3. Wind Power\n",
        );
        assert_eq!(
            plan.section_lines(),
            vec!["1. Introduction", "2. Solar Power", "3. Wind Power"]
        );
    }

    #[test]
    fn test_labeled_blocks() {
        let plan = PlanOutline::new(
            "**Outline:**\n\
             1. Background\n\
             2. Market Size\n\n\
             **Search Queries:**\n\
             renewable energy market 2024\n\
             solar capacity growth\n\n\
             Structure:\n\
             Background covers history.",
        );
        assert_eq!(plan.section_lines(), vec!["1. Background", "2. Market Size"]);
        assert_eq!(
            plan.search_query_lines(),
            vec!["renewable energy market 2024", "solar capacity growth"]
        );
    }

    #[test]
    fn test_inline_label_content_is_kept() {
        let plan = PlanOutline::new("Search Queries: solar cost, wind cost");
        assert_eq!(plan.search_query_lines(), vec!["solar cost, wind cost"]);
        assert!(plan.section_lines().is_empty());
    }

    #[test]
    fn test_missing_block_is_empty() {
        let plan = PlanOutline::new("1. Only sections\n2. Here");
        assert!(plan.search_query_lines().is_empty());
        assert_eq!(plan.section_lines().len(), 2);
    }
}
