use std::{io::Write, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, render::render_state, Phase, SubmissionController, TriageClient,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "triage-desk", about = "Submit a legal case description for triage")]
struct Cli {
    /// Triage service location; overrides triage.toml and the environment.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Per-request timeout in seconds. 0 waits indefinitely.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Triage a single case and exit.
    Submit {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Read one case per line from stdin.
    Interactive,
    /// Check that the triage service is up.
    Health,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = load_settings()?.with_overrides(cli.base_url, cli.timeout_secs);
    let client = Arc::new(TriageClient::new(&settings)?);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Submit { message } => {
            let controller = SubmissionController::new(client);
            controller.submit(message.join(" ")).await?;
            let state = controller.state().await;
            println!("{}", render_state(&state));
            Ok(exit_code_for(state.phase()))
        }
        Command::Health => match client.health().await {
            Ok(health) => {
                println!("{}: {}", client.base_url(), health.status);
                Ok(if health.is_ok() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Err(err) => {
                println!("{}: {err}", client.base_url());
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Interactive => run_interactive(SubmissionController::new(client)).await,
    }
}

fn exit_code_for(phase: Phase) -> ExitCode {
    if phase == Phase::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_interactive(controller: Arc<SubmissionController>) -> Result<ExitCode> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = controller.subscribe();
    println!("Describe your legal issue, one case per line (:quit to exit).");

    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines
            .next_line()
            .await
            .context("failed to read case from stdin")?
        else {
            break;
        };
        let line = line.trim_end_matches('\r');
        if line.trim() == ":quit" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let submission = controller.spawn_submit(line);
        loop {
            match events.recv().await {
                Ok(state) => {
                    println!("{}", render_state(&state));
                    if state.phase().is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "state observer lagged behind");
                }
                Err(RecvError::Closed) => return Ok(ExitCode::FAILURE),
            }
        }
        submission.await.context("submission task panicked")??;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}
