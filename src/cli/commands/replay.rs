//! `replay` command handler.
//!
//! Runs a scenario script through the engine with the scripted
//! interpreter and the static narrator. No network access.

use std::sync::Arc;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ReplayArgs};
use crate::collab::{ScriptedInterpreter, StaticNarrator};
use crate::engine::{SessionHandle, SessionSnapshot, TurnOutcome};
use crate::error::SimError;
use crate::observability::EventEmitter;
use crate::scenario::ScenarioScript;
use crate::sim::GameResult;

use super::render;

/// One replayed turn.
#[derive(Debug, Serialize)]
pub struct ReplayedTurn {
    pub utterance: String,
    #[serde(flatten)]
    pub outcome: TurnOutcome,
}

/// Full replay result.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub name: Option<String>,
    pub turns: Vec<ReplayedTurn>,
    pub result: Option<GameResult>,
    /// Script turns not played because the session had already ended.
    pub skipped: usize,
    #[serde(rename = "final")]
    pub final_state: SessionSnapshot,
}

/// Plays `script` on a fresh session.
///
/// # Errors
///
/// Returns an error if a scripted delta is not a mapping.
pub async fn replay(
    script: &ScenarioScript,
    events: Option<Arc<EventEmitter>>,
) -> Result<ReplayReport, SimError> {
    let interpreter = ScriptedInterpreter::new(script.deltas());
    let narrator = StaticNarrator::default();
    let mut handle = SessionHandle::fresh();
    if let Some(events) = events {
        handle = handle.with_events(events);
    }

    let mut turns = Vec::with_capacity(script.turns.len());
    let mut result = None;
    for turn in &script.turns {
        let outcome = handle
            .play_turn(&turn.utterance, &interpreter, &narrator)
            .await?;
        result = outcome.report.result;
        turns.push(ReplayedTurn {
            utterance: turn.utterance.clone(),
            outcome,
        });
        if result.is_some() {
            break;
        }
    }

    let skipped = script.turns.len() - turns.len();
    if skipped > 0 {
        tracing::info!(skipped, "session ended before the script did");
    }

    Ok(ReplayReport {
        name: script.name.clone(),
        turns,
        result,
        skipped,
        final_state: handle.snapshot().await,
    })
}

/// Replay a scenario file and print the report.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or replayed.
pub async fn run(args: &ReplayArgs) -> Result<(), SimError> {
    let script = ScenarioScript::load(&args.script)?;
    tracing::info!(
        script = %args.script.display(),
        turns = script.turns.len(),
        "replaying scenario"
    );

    let events = match &args.events_file {
        Some(path) => Some(Arc::new(EventEmitter::from_file(path)?)),
        None => None,
    };

    let report = replay(&script, events).await?;

    match args.format {
        OutputFormat::Human => print!("{}", human(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn human(report: &ReplayReport) -> String {
    let mut out = String::new();
    if let Some(name) = &report.name {
        out.push_str(&format!("scenario: {name}\n"));
    }
    for turn in &report.turns {
        out.push_str(&format!("간호사: {}\n", turn.utterance));
        out.push_str(&render::turn(&turn.outcome));
    }
    let status = report.result.map_or("none (session still active)", GameResult::as_str);
    out.push_str(&format!(
        "result: {status} after {} turns",
        report.final_state.turn
    ));
    if report.skipped > 0 {
        out.push_str(&format!(" ({} skipped)", report.skipped));
    }
    out.push('\n');
    out
}
