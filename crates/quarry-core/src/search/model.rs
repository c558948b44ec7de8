//! Search domain models.

use serde::{Deserialize, Serialize};

/// A single organic search hit, in provider relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// Provenance pair for this hit.
    pub fn source(&self) -> Source {
        Source::new(self.title.clone(), self.link.clone())
    }

    /// `"{title}: {snippet}"`, the line format fed to the writer.
    pub fn to_context_line(&self) -> String {
        format!("{}: {}", self.title, self.snippet)
    }
}

/// Provenance of a piece of research content.
///
/// Two sources are the same only when both title and link match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub link: String,
}

impl Source {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// What researching one query produced.
///
/// Keeps "nothing found" apart from "search provider down" so the writer can
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome {
    Found(Vec<SearchResult>),
    NoResults,
    Unavailable { reason: String },
}

impl QueryOutcome {
    /// Builds an outcome from a result list, mapping an empty list to `NoResults`.
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            Self::NoResults
        } else {
            Self::Found(results)
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Found(results) => results,
            Self::NoResults | Self::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results_map_to_no_results() {
        assert_eq!(QueryOutcome::from_results(Vec::new()), QueryOutcome::NoResults);
        let outcome = QueryOutcome::from_results(vec![SearchResult::new("t", "l", "s")]);
        assert_eq!(outcome.results().len(), 1);
    }

    #[test]
    fn test_unavailable_has_no_results() {
        let outcome = QueryOutcome::Unavailable {
            reason: "HTTP 503".into(),
        };
        assert!(outcome.results().is_empty());
        assert!(outcome.is_unavailable());
    }

    #[test]
    fn test_context_line_format() {
        let result = SearchResult::new("Solar 2024", "https://a.example", "Capacity doubled.");
        assert_eq!(result.to_context_line(), "Solar 2024: Capacity doubled.");
        assert_eq!(result.source(), Source::new("Solar 2024", "https://a.example"));
    }
}
