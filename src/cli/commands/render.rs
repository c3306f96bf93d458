//! Plain-text rendering shared by `play` and `replay`.

use std::fmt::Write as _;

use crate::engine::{SessionSnapshot, TurnOutcome};
use crate::sim::{GameResult, MAX_TURN, Phase};

/// Banner shown when a session starts.
#[must_use]
pub fn opening(opening_line: &str, phase: Phase) -> String {
    format!(
        "환자: {opening_line}\n[phase {}] {}\n",
        phase.number(),
        phase.hint()
    )
}

/// Multi-line block describing one played turn.
#[must_use]
pub fn turn(outcome: &TurnOutcome) -> String {
    let report = &outcome.report;
    let mut out = String::new();
    let _ = writeln!(out, "-- turn {}/{MAX_TURN} --", report.turn);
    let _ = writeln!(out, "  patient  {}", report.patient);
    let _ = writeln!(out, "  nurse    {}", report.nurse);
    let _ = writeln!(out, "  phase    {}", report.phase.number());
    if !report.fired.is_empty() {
        let fired: Vec<_> = report.fired.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  fired    {}", fired.join(", "));
    }
    for issue in &outcome.delta_issues {
        let _ = writeln!(out, "  defaulted {issue}");
    }
    match &outcome.reply {
        Some(reply) => {
            let _ = writeln!(out, "환자: {}", reply.line());
        }
        None => {
            let reason = outcome.narration_error.as_deref().unwrap_or("no reply");
            let _ = writeln!(out, "  (patient silent: {reason})");
        }
    }
    match report.result {
        Some(result) => {
            let _ = writeln!(out, "== {} ==", result_banner(result));
        }
        None => {
            let _ = writeln!(out, "[phase {}] {}", report.phase.number(), report.hint);
        }
    }
    out
}

/// One-line state summary for `/state`.
#[must_use]
pub fn snapshot(snap: &SessionSnapshot) -> String {
    let status = snap.result.map_or("active", GameResult::as_str);
    format!(
        "turn {}/{MAX_TURN} | phase {} | {status}\n  patient  {}\n  nurse    {}\n",
        snap.turn,
        snap.phase.number(),
        snap.patient,
        snap.nurse
    )
}

const fn result_banner(result: GameResult) -> &'static str {
    match result {
        GameResult::Success => "SUCCESS: the patient is calm and oriented",
        GameResult::Fail => "FAIL: the patient could not be settled",
        GameResult::TimeOver => "TIME_OVER: out of turns",
    }
}
