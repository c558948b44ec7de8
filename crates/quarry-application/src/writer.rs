//! Writer stage: research context in, report text out.

use std::sync::Arc;

use quarry_core::config::StageSampling;
use quarry_core::{CompletionClient, CompletionRequest, ResearchContext, Result, SectionFinding};

use crate::prompts::{self, REPORT_SECTIONS};

pub struct Writer {
    client: Arc<dyn CompletionClient>,
    sampling: StageSampling,
}

impl Writer {
    pub fn new(client: Arc<dyn CompletionClient>, sampling: StageSampling) -> Self {
        Self { client, sampling }
    }

    /// Writes the full 7-part report from every finding.
    ///
    /// The reply is returned as-is; use [`missing_sections`] to check it.
    pub async fn write_report(&self, topic: &str, context: &ResearchContext) -> Result<String> {
        let request = CompletionRequest::from_prompts(
            prompts::REPORT_WRITER_SYSTEM,
            prompts::report_prompt(topic, &context.to_prompt_text()),
        )
        .with_sampling(&self.sampling);

        let report = self.client.complete(request).await?;
        let missing = missing_sections(&report);
        if !missing.is_empty() {
            tracing::warn!(?missing, "[Writer] Report is missing template sections");
        }
        Ok(report.trim().to_string())
    }

    /// Writes one section body from that section's finding.
    pub async fn write_section(&self, topic: &str, finding: &SectionFinding) -> Result<String> {
        let request = CompletionRequest::from_prompts(
            prompts::SECTION_WRITER_SYSTEM,
            prompts::section_prompt(topic, &finding.label, &finding.to_prompt_block()),
        )
        .with_sampling(&self.sampling);

        let body = self.client.complete(request).await?;
        Ok(body.trim().to_string())
    }
}

/// Template section names not found anywhere in `report`, case-insensitively.
pub fn missing_sections(report: &str) -> Vec<&'static str> {
    let lowered = report.to_lowercase();
    REPORT_SECTIONS
        .iter()
        .copied()
        .filter(|name| !lowered.contains(&name.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_reports_gaps() {
        let report = "## 1. Executive Summary\n...\n## 2. background\n...\n## 7. Conclusion";
        assert_eq!(
            missing_sections(report),
            vec!["Key Findings", "Data Insights", "Challenges", "Future Outlook"]
        );
    }

    #[test]
    fn test_complete_report_has_no_gaps() {
        let report = REPORT_SECTIONS
            .iter()
            .map(|s| format!("## {s}\ntext"))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(missing_sections(&report).is_empty());
    }
}
