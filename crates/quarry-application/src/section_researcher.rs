//! SectionResearcher stage: one search per target.
//!
//! A failed search never aborts the pipeline; it becomes an
//! [`QueryOutcome::Unavailable`] finding so later stages can tell "nothing
//! found" apart from "could not look".

use std::sync::Arc;

use futures::future::join_all;
use quarry_core::config::MAX_FAN_OUT;
use quarry_core::{QueryOutcome, ResearchContext, SearchClient, SectionFinding};

use crate::query_extractor::ResearchTarget;

pub struct SectionResearcher {
    client: Arc<dyn SearchClient>,
    results_per_query: usize,
}

impl SectionResearcher {
    pub fn new(client: Arc<dyn SearchClient>, results_per_query: usize) -> Self {
        Self {
            client,
            results_per_query,
        }
    }

    /// Searches one target.
    pub async fn research(&self, target: &ResearchTarget) -> SectionFinding {
        let outcome = match self.client.search(&target.query, self.results_per_query).await {
            Ok(results) => QueryOutcome::from_results(results),
            Err(err) => {
                tracing::warn!(query = %target.query, error = %err, "[SectionResearcher] Search failed");
                QueryOutcome::Unavailable {
                    reason: err.to_string(),
                }
            }
        };

        tracing::debug!(
            query = %target.query,
            results = outcome.results().len(),
            "[SectionResearcher] Query researched"
        );
        SectionFinding::new(target.label.clone(), target.query.clone(), outcome)
    }

    /// Searches every target and collects findings in target order.
    ///
    /// With `parallel` set, searches run concurrently in batches of at most
    /// [`MAX_FAN_OUT`].
    pub async fn research_all(&self, targets: &[ResearchTarget], parallel: bool) -> ResearchContext {
        let mut context = ResearchContext::new();

        if parallel {
            for batch in targets.chunks(MAX_FAN_OUT) {
                let findings = join_all(batch.iter().map(|target| self.research(target))).await;
                for finding in findings {
                    context.push(finding);
                }
            }
        } else {
            for target in targets {
                context.push(self.research(target).await);
            }
        }

        if context.unavailable_count() > 0 {
            tracing::warn!(
                unavailable = context.unavailable_count(),
                total = targets.len(),
                "[SectionResearcher] Some queries could not be researched"
            );
        }
        context
    }
}
