//! Scripted provider doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quarry_application::prompts;
use quarry_core::config::PipelineConfig;
use quarry_core::{
    CompletionClient, CompletionRequest, MessageRole, QuarryError, Result, SearchClient,
    SearchResult,
};

type CompletionScript = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;
type SearchScript = dyn Fn(&str) -> Result<Vec<SearchResult>> + Send + Sync;

/// Completion double answering through a closure and recording every request.
pub struct ScriptedCompletion {
    script: Box<CompletionScript>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(script: impl Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_with_system(&self, system: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| system_prompt(r) == system)
            .count()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(&request)
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Search double answering through a closure, honoring the result limit.
pub struct ScriptedSearch {
    script: Box<SearchScript>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSearch {
    pub fn new(script: impl Fn(&str) -> Result<Vec<SearchResult>> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Returns `count` distinct results per query.
    pub fn with_results(count: usize) -> Arc<Self> {
        Self::new(move |query| Ok(results_for(query, count)))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn limits(&self) -> Vec<usize> {
        self.queries.lock().unwrap().iter().map(|(_, l)| *l).collect()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push((query.to_string(), limit));
        let mut results = (self.script)(query)?;
        results.truncate(limit);
        Ok(results)
    }
}

pub fn results_for(query: &str, count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| {
            SearchResult::new(
                format!("{query} result {i}"),
                format!("https://example.com/{}/{i}", query.replace(' ', "-")),
                format!("Snippet {i} about {query}."),
            )
        })
        .collect()
}

pub fn system_prompt(request: &CompletionRequest) -> &str {
    request
        .messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

pub fn user_prompt(request: &CompletionRequest) -> &str {
    request.last_user_content().unwrap_or_default()
}

pub const RENEWABLE_PLAN: &str = "1. Introduction to Renewable Energy\n\
    2. Solar Power Technologies\n\
    3. Wind Energy Developments\n\
    4. Energy Storage Solutions\n\
    5. Policy and Economic Outlook";

pub fn seven_part_report() -> String {
    prompts::REPORT_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, name)| format!("## {}. {name}\nFindings (Source: Renewables result 1).", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Completion script that answers each stage sensibly.
pub fn happy_script(request: &CompletionRequest) -> Result<String> {
    match system_prompt(request) {
        s if s == prompts::PLANNER_SYSTEM => Ok(RENEWABLE_PLAN.to_string()),
        s if s == prompts::EXTRACTOR_SYSTEM => {
            Ok("solar capacity growth, wind turbine efficiency, grid battery storage".to_string())
        }
        s if s == prompts::SECTION_WRITER_SYSTEM => Ok("Section body based on results.".to_string()),
        s if s == prompts::REPORT_WRITER_SYSTEM => Ok(seven_part_report()),
        s if s == prompts::REFINER_SYSTEM => Ok("Refined report.".to_string()),
        other => Err(QuarryError::internal(format!("unexpected system prompt: {other}"))),
    }
}

pub fn test_config() -> PipelineConfig {
    PipelineConfig::default()
}
