use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use quarry_core::PipelineMode;
use quarry_execution::{QuarryRuntime, TracingOptions, init_tracing};

pub struct ReportOptions {
    pub mode: Option<PipelineMode>,
    pub pdf: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub parallel: bool,
}

pub fn parse_mode(value: &str) -> Result<PipelineMode, String> {
    PipelineMode::from_str(value.trim())
        .map_err(|_| format!("unknown mode '{value}', expected 'sectioned' or 'agents'"))
}

/// Runs one report and prints it to stdout; progress goes to stderr.
pub async fn run(topic: &str, options: ReportOptions) -> Result<()> {
    init_tracing(TracingOptions::from_env())?;

    let parallel = options.parallel;
    let runtime = QuarryRuntime::load_with(|config| {
        config.parallel_research |= parallel;
    })
    .context("Failed to load configuration")?;
    let mode = options.mode.unwrap_or(runtime.config.mode);

    let usecase = runtime.usecase.clone();
    let session_id = usecase.create_session().await;

    let generated = match usecase.generate(&session_id, topic, mode).await {
        Ok(generated) => generated,
        Err(failure) => {
            if let Some(plan) = &failure.partial.plan {
                println!("{plan}\n");
            }
            bail!(failure);
        }
    };

    println!("{}", generated.text());

    if let Some(path) = options.output {
        std::fs::write(&path, generated.text())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }
    if let Some(path) = options.pdf {
        let written = usecase.export_pdf(&session_id, &path).await?;
        eprintln!("Wrote {}", written.display());
    }

    Ok(())
}
