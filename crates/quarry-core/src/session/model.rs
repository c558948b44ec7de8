//! Session domain model.
//!
//! A session holds everything an interactive user accumulates between
//! pipeline runs: the log of generated reports, the report currently being
//! refined, and the follow-up exchanges applied to it.

use serde::{Deserialize, Serialize};

/// A report produced by one full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub topic: String,
    pub report: String,
    /// Timestamp when the entry was recorded (ISO 8601 format)
    pub created_at: String,
}

/// One follow-up instruction and the report it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub report: String,
    /// Timestamp when the turn was recorded (ISO 8601 format)
    pub created_at: String,
}

/// Per-session state.
///
/// Fields are private so `history` stays append-only: callers can read
/// entries but never get mutable access to one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    history: Vec<HistoryEntry>,
    current_report: Option<String>,
    chat_history: Vec<ChatTurn>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// History entry by 1-based position, as listed to users.
    pub fn entry(&self, position: usize) -> Option<&HistoryEntry> {
        position
            .checked_sub(1)
            .and_then(|index| self.history.get(index))
    }

    pub fn current_report(&self) -> Option<&str> {
        self.current_report.as_deref()
    }

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat_history
    }

    /// Records a successful full report generation.
    ///
    /// Appends to history and replaces the current report. Chat history is
    /// left as is; it is a log for the whole session.
    pub fn record_generation(&mut self, topic: impl Into<String>, report: impl Into<String>) {
        let report = report.into();
        self.history.push(HistoryEntry {
            topic: topic.into(),
            report: report.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        self.current_report = Some(report);
    }

    /// Records a successful refinement, replacing the current report.
    pub fn record_refinement(&mut self, question: impl Into<String>, report: impl Into<String>) {
        let report = report.into();
        self.chat_history.push(ChatTurn {
            question: question.into(),
            report: report.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        self.current_report = Some(report);
    }
}
