mod command;
mod helper;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use quarry_core::PipelineMode;
use quarry_execution::{PipelineEvent, PipelineEventLayer, QuarryRuntime, TracingOptions, init_tracing};
use quarry_infrastructure::export::{REPORT_FILE_NAME, REPORT_MIME_TYPE};

use crate::command::ReplCommand;
use crate::helper::CliHelper;

/// Interactive session: one `ReportSessionUsecase` session for the whole REPL.
struct Repl {
    runtime: QuarryRuntime,
    session_id: String,
    mode: PipelineMode,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl Repl {
    async fn generate(&mut self, topic: &str) {
        self.drain_events();
        println!("{}", format!("Researching \"{topic}\" ({} mode)", self.mode).bright_magenta());

        let usecase = self.runtime.usecase.clone();
        let session_id = self.session_id.clone();
        let generation = usecase.generate(&session_id, topic, self.mode);
        tokio::pin!(generation);

        // Print stage events as they arrive, in order with the final result
        let result = loop {
            tokio::select! {
                result = &mut generation => break result,
                Some(event) = self.events.recv() => render::print_event(&event),
            }
        };
        while let Ok(event) = self.events.try_recv() {
            render::print_event(&event);
        }

        match result {
            Ok(generated) => render::print_report(&generated),
            Err(failure) => render::print_failure(&failure),
        }
    }

    async fn refine(&mut self, instruction: &str) {
        println!("{}", "Refining report…".bright_black());
        match self.runtime.usecase.refine(&self.session_id, instruction).await {
            Ok(report) => {
                println!();
                render::print_text(&report);
            }
            Err(err) => render::print_error(format!("Refiner failed: {err}")),
        }
    }

    async fn export(&self, path: Option<PathBuf>) {
        let path = path.unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME));
        match self.runtime.usecase.export_pdf(&self.session_id, &path).await {
            Ok(written) => println!(
                "{}",
                format!("Saved {} ({REPORT_MIME_TYPE})", written.display()).green()
            ),
            Err(err) => render::print_error(err),
        }
    }

    async fn history(&self) {
        match self.runtime.usecase.snapshot(&self.session_id).await {
            Ok(state) => render::print_history(state.history()),
            Err(err) => render::print_error(err),
        }
    }

    async fn show(&self, position: usize) {
        match self.runtime.usecase.snapshot(&self.session_id).await {
            Ok(state) => match state.entry(position) {
                Some(entry) => render::print_text(&entry.report),
                None => render::print_error(format!(
                    "No report #{position}; there are {} in history",
                    state.history().len()
                )),
            },
            Err(err) => render::print_error(err),
        }
    }

    async fn chat(&self) {
        match self.runtime.usecase.snapshot(&self.session_id).await {
            Ok(state) => render::print_chat(state.chat_history()),
            Err(err) => render::print_error(err),
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            render::print_event(&event);
        }
    }
}

/// The main entry point for the Quarry readline REPL.
///
/// Sets up tracing with the pipeline event layer, loads configuration and
/// credentials, then reads commands until `quit` or EOF.
#[tokio::main]
async fn main() -> Result<()> {
    // ===== Backend Initialization =====
    let (event_layer, events) = PipelineEventLayer::channel();
    init_tracing(
        TracingOptions::from_env()
            .with_default_filter("quarry=warn")
            .with_events(event_layer),
    )?;

    let runtime = match QuarryRuntime::load() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{}", format!("{err}").red());
            if err.is_configuration() {
                eprintln!(
                    "{}",
                    "Set GROQ_API_KEY and SERPER_API_KEY, or run `quarry config init`.".yellow()
                );
            }
            return Err(err.into());
        }
    };

    let session_id = runtime.usecase.create_session().await;
    let mode = runtime.config.mode;
    let mut repl = Repl {
        runtime,
        session_id,
        mode,
        events,
    };

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    render::print_banner(repl.mode);

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match ReplCommand::parse(trimmed) {
                    ReplCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ReplCommand::Topic(topic) => repl.generate(&topic).await,
                    ReplCommand::Refine(instruction) => repl.refine(&instruction).await,
                    ReplCommand::History => repl.history().await,
                    ReplCommand::Show(position) => repl.show(position).await,
                    ReplCommand::Export(path) => repl.export(path).await,
                    ReplCommand::Mode(mode) => {
                        repl.mode = mode;
                        println!("{}", format!("Mode set to {mode}").green());
                    }
                    ReplCommand::Chat => repl.chat().await,
                    ReplCommand::Help => render::print_help(),
                    ReplCommand::Usage(usage) => {
                        println!("{}", format!("Usage: {usage}").yellow());
                    }
                    ReplCommand::Unknown(name) => {
                        println!("{}", format!("Unknown command {name}; try /help").bright_black());
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    repl.runtime.usecase.close_session(&repl.session_id).await;
    Ok(())
}
