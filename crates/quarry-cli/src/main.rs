use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quarry_core::PipelineMode;

mod commands;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry - research reports from LLM planning and web search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a topic and print the report
    Report {
        /// Topic to research
        topic: String,
        /// Report flow: sectioned or agents (default from config.toml)
        #[arg(long, value_parser = commands::report::parse_mode)]
        mode: Option<PipelineMode>,
        /// Also write the report as PDF to this path
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Also write the report text to this path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Research all queries concurrently
        #[arg(long)]
        parallel: bool,
    },
    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print config and secret file locations
    Path,
    /// Write template config.toml and secret.json if missing
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            topic,
            mode,
            pdf,
            output,
            parallel,
        } => {
            let options = commands::report::ReportOptions {
                mode,
                pdf,
                output,
                parallel,
            };
            commands::report::run(&topic, options).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init => commands::config::init()?,
        },
    }

    Ok(())
}
