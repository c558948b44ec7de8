//! ReportAssembler stage: final text with a deduplicated reference list.

use std::collections::HashSet;

use quarry_core::Source;
use serde::{Deserialize, Serialize};

/// A written section; untitled bodies are emitted without a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: Option<String>,
    pub body: String,
}

impl ReportSection {
    pub fn titled(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: body.into(),
        }
    }

    pub fn untitled(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }
}

/// The finished report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledReport {
    pub topic: String,
    pub sections: Vec<ReportSection>,
    /// Deduplicated, in first-seen order; position + 1 is the reference number
    pub references: Vec<Source>,
    pub text: String,
}

/// Removes repeated `(title, link)` pairs, keeping the first occurrence.
pub fn dedupe_sources(sources: &[Source]) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|source| seen.insert(*source))
        .cloned()
        .collect()
}

/// `"{n}. {title} - {link}"` lines, numbered from 1.
pub fn references_block(references: &[Source]) -> String {
    references
        .iter()
        .enumerate()
        .map(|(i, source)| format!("{}. {} - {}", i + 1, source.title, source.link))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, topic: &str, sections: Vec<ReportSection>, sources: &[Source]) -> AssembledReport {
        let references = dedupe_sources(sources);
        let mut text = format!("# Research Report on {}\n\n", topic.trim());

        for section in &sections {
            if let Some(title) = &section.title {
                text.push_str(&format!("## {title}\n"));
            }
            text.push_str(section.body.trim());
            text.push_str("\n\n");
        }

        text.push_str("## References\n");
        if references.is_empty() {
            text.push_str("No sources were retrieved.\n");
        } else {
            text.push_str(&references_block(&references));
            text.push('\n');
        }

        tracing::debug!(
            sections = sections.len(),
            references = references.len(),
            "[ReportAssembler] Report assembled"
        );

        AssembledReport {
            topic: topic.trim().to_string(),
            sections,
            references,
            text,
        }
    }
}
