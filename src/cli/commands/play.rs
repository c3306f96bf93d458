//! `play` command handler.
//!
//! Interactive stdin loop against an OpenAI-compatible endpoint. Lines
//! starting with `/` are commands: `/state`, `/reset`, `/quit`.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::cli::args::PlayArgs;
use crate::collab::OpenAiClient;
use crate::config::{ConfigLoader, SimConfig};
use crate::engine::SessionHandle;
use crate::error::{GameError, SimError};
use crate::observability::EventEmitter;

use super::render;

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Utterance(&'a str),
    State,
    Reset,
    Quit,
    Unknown(&'a str),
    Blank,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        "/state" => Input::State,
        "/reset" => Input::Reset,
        "/quit" | "/exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Utterance(text),
    }
}

/// Run an interactive session until `/quit`, EOF, or cancellation.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the API key is
/// missing, or stdin cannot be read. Failed turns are reported and the
/// loop continues.
pub async fn run(args: &PlayArgs, cancel: CancellationToken) -> Result<(), SimError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let config = match &args.config {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            let load_result = ConfigLoader::default().load(path)?;
            for warning in &load_result.warnings {
                tracing::warn!(
                    location = warning.location.as_deref().unwrap_or("<unknown>"),
                    "{}",
                    warning.message
                );
            }
            load_result.config
        }
        None => SimConfig::default(),
    };

    let client = OpenAiClient::from_config(&config.llm)?;
    tracing::info!(endpoint = client.endpoint(), model = %config.llm.model, "collaborator ready");

    let emitter = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::stderr(),
    };
    let handle = SessionHandle::fresh().with_events(Arc::new(emitter));

    let opening_line = config.game.opening_line.as_str();
    print!("{}", render::opening(opening_line, handle.snapshot().await.phase));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("play cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::debug!("stdin closed");
            break;
        };

        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::State => print!("{}", render::snapshot(&handle.snapshot().await)),
            Input::Reset => {
                let snap = handle.reset().await;
                print!("{}", render::opening(opening_line, snap.phase));
            }
            Input::Unknown(cmd) => println!("unknown command {cmd} (try /state, /reset, /quit)"),
            Input::Utterance(text) => {
                let played = tokio::select! {
                    () = cancel.cancelled() => break,
                    played = handle.play_turn(text, &client, &client) => played,
                };
                match played {
                    Ok(outcome) => {
                        print!("{}", render::turn(&outcome));
                        if outcome.report.result.is_some() {
                            println!("/reset to play again, /quit to leave");
                        }
                    }
                    Err(SimError::Game(GameError::GameOver { result, .. })) => {
                        println!("the session already ended ({result}); /reset to play again");
                    }
                    Err(SimError::Collaborator(e)) => {
                        eprintln!("turn not applied: {e}");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(())
}
