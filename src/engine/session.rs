//! Session state and the turn state machine.
//!
//! A [`Session`] is an owned value: one patient vector, one nurse vector,
//! a turn counter, an append-only conversation history and a status that
//! moves from `Active` to `Terminal` exactly once.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::GameError;
use crate::sim::{
    GameResult, NurseState, PatientState, Phase, ThresholdRule, TurnDelta, score,
};

/// Speaker of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The nurse (player).
    User,
    /// The simulated patient.
    Assistant,
}

impl Role {
    /// Chat-completion role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-tagged line of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Turns are accepted.
    Active,
    /// A result was reached; the session no longer changes.
    Terminal(GameResult),
}

/// Everything a caller needs after one accepted turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub patient: PatientState,
    pub nurse: NurseState,
    pub phase: Phase,
    pub hint: &'static str,
    pub result: Option<GameResult>,
    /// Threshold rules that fired while scoring this turn.
    pub fired: Vec<ThresholdRule>,
}

/// Read-only view of a session at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub turn: u32,
    pub patient: PatientState,
    pub nurse: NurseState,
    pub phase: Phase,
    pub hint: &'static str,
    pub result: Option<GameResult>,
    pub history_len: usize,
}

/// A single simulation run.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    patient: PatientState,
    nurse: NurseState,
    turn: u32,
    phase: Phase,
    status: SessionStatus,
    history: Vec<HistoryEntry>,
    ending: Option<String>,
}

impl Session {
    /// Creates a fresh, active session with the initial vectors.
    #[must_use]
    pub fn new() -> Self {
        let patient = PatientState::default();
        let session = Self {
            id: Uuid::new_v4(),
            patient,
            nurse: NurseState::default(),
            turn: 0,
            phase: Phase::select(&patient),
            status: SessionStatus::Active,
            history: Vec::new(),
            ending: None,
        };
        debug!(session_id = %session.id, "session created");
        session
    }

    /// Discards all state and starts over under a new id.
    pub fn reset(&mut self) {
        let previous = self.id;
        *self = Self::new();
        info!(previous = %previous, session_id = %self.id, "session reset");
    }

    /// Applies one nurse turn.
    ///
    /// Increments the turn counter, records the utterance, scores the delta,
    /// re-derives the phase and adjudicates the outcome. On a result the
    /// session becomes terminal.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the session is already terminal;
    /// nothing is mutated in that case.
    pub fn apply_turn(
        &mut self,
        utterance: impl Into<String>,
        delta: &TurnDelta,
    ) -> Result<TurnReport, GameError> {
        self.ensure_active()?;

        let scored = score(&self.patient, &self.nurse, delta);

        self.turn += 1;
        self.history.push(HistoryEntry {
            role: Role::User,
            content: utterance.into(),
        });
        self.patient = scored.patient;
        self.nurse = scored.nurse;
        self.phase = Phase::select(&self.patient);

        let result = GameResult::evaluate(&self.patient, self.turn);
        if let Some(result) = result {
            self.status = SessionStatus::Terminal(result);
            info!(session_id = %self.id, turn = self.turn, %result, "session ended");
        }

        debug!(
            session_id = %self.id,
            turn = self.turn,
            phase = %self.phase,
            patient = %self.patient,
            fired = ?scored.fired,
            "turn applied"
        );

        Ok(TurnReport {
            turn: self.turn,
            patient: self.patient,
            nurse: self.nurse,
            phase: self.phase,
            hint: self.phase.hint(),
            result,
            fired: scored.fired,
        })
    }

    /// Appends the patient's in-character reply to the history.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] on a terminal session and
    /// [`GameError::EmptyNarration`] for a blank line.
    pub fn record_patient_line(&mut self, line: impl Into<String>) -> Result<(), GameError> {
        self.ensure_active()?;
        let line = line.into();
        if line.trim().is_empty() {
            return Err(GameError::EmptyNarration);
        }
        self.history.push(HistoryEntry {
            role: Role::Assistant,
            content: line,
        });
        Ok(())
    }

    /// Stores the ending line of a terminal session. Not part of the
    /// conversation history.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EndingRejected`] if the session is still active
    /// or already has an ending, and [`GameError::EmptyNarration`] for a
    /// blank line.
    pub fn record_ending(&mut self, line: impl Into<String>) -> Result<(), GameError> {
        if self.result().is_none() {
            return Err(GameError::EndingRejected("session is still active".into()));
        }
        if self.ending.is_some() {
            return Err(GameError::EndingRejected("ending already recorded".into()));
        }
        let line = line.into();
        if line.trim().is_empty() {
            return Err(GameError::EmptyNarration);
        }
        self.ending = Some(line);
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Terminal(result) => Err(GameError::GameOver {
                result,
                turn: self.turn,
            }),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn patient(&self) -> &PatientState {
        &self.patient
    }

    #[must_use]
    pub const fn nurse(&self) -> &NurseState {
        &self.nurse
    }

    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn hint(&self) -> &'static str {
        self.phase.hint()
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Terminal result, if any.
    #[must_use]
    pub const fn result(&self) -> Option<GameResult> {
        match self.status {
            SessionStatus::Active => None,
            SessionStatus::Terminal(r) => Some(r),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.status, SessionStatus::Terminal(_))
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn ending(&self) -> Option<&str> {
        self.ending.as_deref()
    }

    /// Returns a serializable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            turn: self.turn,
            patient: self.patient,
            nurse: self.nurse,
            phase: self.phase,
            hint: self.hint(),
            result: self.result(),
            history_len: self.history.len(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
