//! Colored terminal output for the REPL.

use colored::Colorize;
use quarry_application::{GeneratedReport, StageFailure};
use quarry_core::PipelineMode;
use quarry_core::session::{ChatTurn, HistoryEntry};
use quarry_execution::PipelineEvent;
use quarry_infrastructure::export::REPORT_FILE_NAME;

pub fn print_banner(mode: PipelineMode) {
    println!("{}", "=== Quarry Research REPL ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a topic to research it, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!("{}", format!("Mode: {mode}").bright_black());
    println!();
}

pub fn print_help() {
    let rows = [
        ("<topic>", "Research a topic and write a report"),
        ("/refine <instruction>", "Revise the current report"),
        ("/history", "List reports generated this session"),
        ("/show <n>", "Show report n from /history"),
        ("/export [path]", "Save the current report as PDF"),
        ("/mode sectioned|agents", "Switch report flow"),
        ("/chat", "List refinements applied this session"),
        ("quit", "Leave"),
    ];
    for (usage, description) in rows {
        println!("  {:<24} {}", usage.bright_cyan(), description.bright_black());
    }
}

/// Status line for one stage event.
pub fn print_event(event: &PipelineEvent) {
    let Some(stage) = event.stage() else {
        return;
    };

    match event.status() {
        Some("started") => println!("{}", format!("… {stage}").bright_black()),
        Some("progress") => {
            if let Some(section) = event.field_str("section") {
                println!("{}", format!("  ✓ {section}").bright_black());
            }
        }
        Some("completed") => {
            println!("{}", format!("✓ {}", event.message).green());
            if let Some(plan) = event.field_str("plan") {
                for line in plan.lines().filter(|l| !l.trim().is_empty()) {
                    println!("  {}", line.yellow());
                }
            }
        }
        Some("failed") => println!("{}", format!("✗ {}", event.message).red()),
        _ => {}
    }
}

pub fn print_report(generated: &GeneratedReport) {
    println!();
    print_text(generated.text());
    if !generated.missing_sections.is_empty() {
        println!(
            "{}",
            format!(
                "Note: the report is missing: {}",
                generated.missing_sections.join(", ")
            )
            .yellow()
        );
    }
    println!(
        "{}",
        format!("Use /export to save it as {REPORT_FILE_NAME}, or /refine to revise it.")
            .bright_black()
    );
}

pub fn print_failure(failure: &StageFailure) {
    eprintln!("{}", format!("{} failed: {}", failure.stage, failure.error).red());

    let partial = &failure.partial;
    if partial.plan.is_some() {
        let researched = partial
            .context
            .as_ref()
            .map(|c| c.findings().len())
            .unwrap_or(0);
        eprintln!(
            "{}",
            format!(
                "Kept: plan, {} queries, {} researched, {} sections written",
                partial.targets.len(),
                researched,
                partial.sections.len()
            )
            .bright_black()
        );
    }
    if failure.error.is_retryable() {
        eprintln!("{}", "The provider may recover; try again shortly.".bright_black());
    }
}

pub fn print_text(text: &str) {
    for line in text.lines() {
        if line.starts_with('#') {
            println!("{}", line.bright_blue().bold());
        } else {
            println!("{}", line.bright_blue());
        }
    }
    println!();
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No reports yet.".bright_black());
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{:>3}.", i + 1).bright_cyan(),
            entry.topic,
            format!("({})", entry.created_at).bright_black()
        );
    }
}

pub fn print_chat(turns: &[ChatTurn]) {
    if turns.is_empty() {
        println!("{}", "No refinements yet.".bright_black());
        return;
    }
    for (i, turn) in turns.iter().enumerate() {
        println!(
            "{} {}",
            format!("{:>3}.", i + 1).bright_cyan(),
            turn.question.green()
        );
    }
}

pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{}", format!("Error: {message}").red());
}
