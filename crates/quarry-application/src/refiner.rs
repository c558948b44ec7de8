//! Refiner stage: revise the current report from a follow-up instruction.

use std::sync::Arc;

use quarry_core::config::StageSampling;
use quarry_core::{CompletionClient, CompletionRequest, QuarryError, Result, SessionState};

use crate::prompts;

pub struct Refiner {
    client: Arc<dyn CompletionClient>,
    sampling: StageSampling,
}

impl Refiner {
    pub fn new(client: Arc<dyn CompletionClient>, sampling: StageSampling) -> Self {
        Self { client, sampling }
    }

    /// Returns `report` revised per `instruction`.
    pub async fn refine(&self, report: &str, instruction: &str) -> Result<String> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(QuarryError::invalid_input("Refinement instruction must not be empty"));
        }

        let request = CompletionRequest::from_prompts(
            prompts::REFINER_SYSTEM,
            prompts::refine_prompt(report, instruction),
        )
        .with_sampling(&self.sampling);

        let revised = self.client.complete(request).await?;
        Ok(revised.trim().to_string())
    }

    /// Refines the session's current report.
    ///
    /// The session is only touched when refinement succeeds: the revised
    /// report becomes current and the turn is appended to chat history. On
    /// any error the session is left exactly as it was.
    pub async fn refine_session(&self, state: &mut SessionState, instruction: &str) -> Result<String> {
        let current = state
            .current_report()
            .ok_or_else(|| QuarryError::invalid_input("No report to refine yet; generate one first"))?
            .to_string();

        let revised = self.refine(&current, instruction).await?;
        state.record_refinement(instruction.trim(), revised.clone());
        tracing::info!(
            turns = state.chat_history().len(),
            "[Refiner] Report revised"
        );
        Ok(revised)
    }
}
