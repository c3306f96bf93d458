//! External collaborators of the state engine.
//!
//! The engine never talks to a model directly. An [`Interpreter`] turns a
//! nurse utterance into a [`ParsedDelta`], and a [`Narrator`] voices the
//! patient once the turn has been scored. Both are trait objects so the
//! interactive game can use an OpenAI-compatible endpoint while replays and
//! tests use the offline implementations in [`scripted`].

pub mod openai;
pub mod prompts;
pub mod scripted;

use async_trait::async_trait;

use crate::engine::HistoryEntry;
use crate::error::CollaboratorError;
use crate::sim::{GameResult, ParsedDelta, PatientState, Phase};

pub use openai::OpenAiClient;
pub use scripted::{ScriptedInterpreter, StaticNarrator};

/// Metrics and log label for interpreter calls.
pub const INTERPRETER: &str = "interpreter";

/// Metrics and log label for narrator calls.
pub const NARRATOR: &str = "narrator";

/// Scores a nurse utterance.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Returns the delta for `utterance`, given the patient state before
    /// the turn is applied.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] if the delta cannot be produced.
    async fn interpret(
        &self,
        utterance: &str,
        patient: &PatientState,
    ) -> Result<ParsedDelta, CollaboratorError>;
}

/// What a narrator sees when voicing the patient after a turn.
#[derive(Debug, Clone, Copy)]
pub struct NarrationContext<'a> {
    pub phase: Phase,
    pub patient: &'a PatientState,
    /// Full conversation so far, ending with the nurse's latest utterance.
    pub history: &'a [HistoryEntry],
}

/// Produces patient dialogue.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// One in-character line for an ongoing session.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] if no line can be produced.
    async fn patient_line(&self, ctx: NarrationContext<'_>) -> Result<String, CollaboratorError>;

    /// Closing line for a session that just ended with `result`.
    ///
    /// # Errors
    ///
    /// Returns a [`CollaboratorError`] if no line can be produced.
    async fn ending_line(&self, result: GameResult) -> Result<String, CollaboratorError>;
}
