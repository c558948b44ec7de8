use std::path::PathBuf;
use std::str::FromStr;

use quarry_core::PipelineMode;

/// Slash commands offered for completion and hints.
pub const COMMANDS: [&str; 7] = [
    "/refine", "/history", "/show", "/export", "/mode", "/chat", "/help",
];

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text: generate a report on this topic
    Topic(String),
    Refine(String),
    History,
    /// 1-based history position
    Show(usize),
    Export(Option<PathBuf>),
    Mode(PipelineMode),
    Chat,
    Help,
    Quit,
    /// A known command used wrongly; the message says how to use it
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    /// Parses a trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Self::Quit;
        }
        if !line.starts_with('/') {
            return Self::Topic(line.to_string());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/refine" if rest.is_empty() => Self::Usage("/refine <instruction>"),
            "/refine" => Self::Refine(rest.to_string()),
            "/history" => Self::History,
            "/show" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Self::Show(n),
                _ => Self::Usage("/show <n>  (n as listed by /history)"),
            },
            "/export" if rest.is_empty() => Self::Export(None),
            "/export" => Self::Export(Some(PathBuf::from(rest))),
            "/mode" => match PipelineMode::from_str(rest) {
                Ok(mode) => Self::Mode(mode),
                Err(_) => Self::Usage("/mode sectioned|agents"),
            },
            "/chat" => Self::Chat,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}
