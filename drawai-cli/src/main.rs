mod cli;
mod config;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use drawai_artifact::LocalArtifactService;
use drawai_backend::DefaultBackendProvider;
use drawai_graph::{FileCheckpointer, RunStatus, drawing_graph};
use drawai_reasoning::HeuristicReasoner;
use drawai_runner::{DrawingService, DrawingServiceConfig, RunOutcome};
use drawai_telemetry::LogTraceSink;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let telemetry = if cli.json_logs {
        drawai_telemetry::init_json_telemetry("drawai")
    } else {
        drawai_telemetry::init_telemetry("drawai")
    };
    if let Err(e) = telemetry {
        eprintln!("warning: logging unavailable: {e}");
    }

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", settings.engine.to_toml_string()?);
            Ok(())
        }
        Commands::Pending => {
            for run_id in build_service(&settings)?.pending_runs().await? {
                println!("{run_id}");
            }
            Ok(())
        }
        Commands::Draw { request, no_input, json } => {
            let service = build_service(&settings)?;
            let mut outcome = service.draw(&request.join(" ")).await?;

            let interactive = !no_input && !json && std::io::stdin().is_terminal();
            if interactive && outcome.is_awaiting_input() {
                let question = outcome.clarifying_question.clone().unwrap_or_default();
                if let Some(answer) = ask(&question).await? {
                    outcome = service.resume(&outcome.run_id, &answer).await?;
                }
            }
            report(&settings, &outcome, json)
        }
        Commands::Resume { run_id, clarification, json } => {
            let service = build_service(&settings)?;
            let outcome = service.resume(&run_id, &clarification.join(" ")).await?;
            report(&settings, &outcome, json)
        }
    }
}

fn build_service(settings: &Settings) -> Result<DrawingService> {
    let artifacts = Arc::new(LocalArtifactService::new(&settings.output_dir));
    let canvas = settings.engine.canvas.clone();
    let service = DrawingService::new(DrawingServiceConfig {
        graph: drawing_graph()?,
        engine: settings.engine.clone(),
        reasoner: Arc::new(HeuristicReasoner::new(canvas.clone())),
        backends: Arc::new(DefaultBackendProvider::new(canvas, artifacts)),
        checkpointer: Arc::new(FileCheckpointer::new(&settings.checkpoint_dir)),
        trace: Some(Arc::new(LogTraceSink)),
    })?;
    Ok(service)
}

/// Prompt on stdout and read one non-empty line from stdin.
async fn ask(question: &str) -> Result<Option<String>> {
    println!("{question}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
    Ok(None)
}

fn report(settings: &Settings, outcome: &RunOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        match outcome.status {
            RunStatus::Completed => {
                if let Some(artifact) = &outcome.artifact_ref {
                    println!("{}", settings.output_dir.join(artifact.as_str()).display());
                }
            }
            RunStatus::AwaitingInput => {
                println!("{}", outcome.clarifying_question.as_deref().unwrap_or_default());
                println!("resume with: drawai resume {} \"<clarification>\"", outcome.run_id);
            }
            _ => {}
        }
    }

    if let (RunStatus::Failed, Some(error)) = (outcome.status, &outcome.error) {
        bail!("run {} failed: {error}", outcome.run_id);
    }
    Ok(())
}
