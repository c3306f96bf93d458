//! Async session handle.
//!
//! A turn is a single critical section: the lock is taken before the
//! interpreter is called and released after the narrator has answered, so
//! concurrent callers on one handle are applied strictly one after another.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::collab::{INTERPRETER, Interpreter, NARRATOR, NarrationContext, Narrator};
use crate::error::{GameError, SimError};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

use super::session::{Session, SessionSnapshot, TurnReport};

/// What the patient said after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "line", rename_all = "snake_case")]
pub enum Reply {
    /// In-character line of an ongoing session.
    Patient(String),
    /// Closing line of a session that just ended.
    Ending(String),
}

impl Reply {
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::Patient(line) | Self::Ending(line) => line,
        }
    }
}

/// Result of [`SessionHandle::play_turn`].
///
/// The turn itself is committed even when narration fails; in that case
/// `reply` is `None` and `narration_error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub report: TurnReport,
    pub reply: Option<Reply>,
    pub narration_error: Option<String>,
    /// Delta fields that were defaulted to zero.
    pub delta_issues: Vec<String>,
}

/// Shared, lock-protected session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<Session>>,
    events: Option<Arc<EventEmitter>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            events: None,
        }
    }

    /// Handle over a brand new session.
    #[must_use]
    pub fn fresh() -> Self {
        Self::new(Session::new())
    }

    /// Attaches an event stream and announces the current session on it.
    #[must_use]
    pub fn with_events(mut self, emitter: Arc<EventEmitter>) -> Self {
        if let Ok(session) = self.session.try_lock() {
            emitter.emit(Event::SessionStarted {
                timestamp: Utc::now(),
                session_id: session.id(),
                patient: *session.patient(),
            });
        }
        self.events = Some(emitter);
        self
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Plays one nurse turn end to end.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the session already ended (the
    /// interpreter is not called), or the interpreter's error. In both
    /// cases nothing is committed.
    pub async fn play_turn(
        &self,
        utterance: &str,
        interpreter: &dyn Interpreter,
        narrator: &dyn Narrator,
    ) -> Result<TurnOutcome, SimError> {
        let mut session = self.session.lock().await;
        if let Some(result) = session.result() {
            return Err(GameError::GameOver {
                result,
                turn: session.turn(),
            }
            .into());
        }

        let session_id = session.id();

        let started = Instant::now();
        let interpreted = interpreter.interpret(utterance, session.patient()).await;
        metrics::record_collaborator_duration(INTERPRETER, started.elapsed());
        let parsed = interpreted.inspect_err(|e| {
            metrics::record_collaborator_error(INTERPRETER);
            warn!(session_id = %session_id, error = %e, "interpreter failed, turn abandoned");
        })?;

        let delta_issues: Vec<String> = parsed.issues.iter().map(ToString::to_string).collect();
        for issue in &delta_issues {
            warn!(session_id = %session_id, %issue, "delta field defaulted");
        }

        let report = session.apply_turn(utterance, &parsed.delta)?;

        metrics::record_turn(&report.fired);
        metrics::set_current_phase(report.phase);
        self.emit(Event::TurnApplied {
            timestamp: Utc::now(),
            session_id,
            turn: report.turn,
            phase: report.phase,
            patient: report.patient,
            nurse: report.nurse,
            fired: report.fired.clone(),
            delta_issues: delta_issues.clone(),
        });

        let started = Instant::now();
        let (reply, narration_error) = if let Some(result) = report.result {
            metrics::record_result(result);
            let narrated = narrator
                .ending_line(result)
                .await
                .map_err(SimError::from)
                .and_then(|line| {
                    session.record_ending(line.clone())?;
                    Ok(line)
                });
            let ending = narrated.as_ref().ok().cloned();
            self.emit(Event::SessionEnded {
                timestamp: Utc::now(),
                session_id,
                turn: report.turn,
                result,
                ending,
            });
            info!(session_id = %session_id, turn = report.turn, %result, "game over");
            split(narrated.map(Reply::Ending))
        } else {
            let ctx = NarrationContext {
                phase: session.phase(),
                patient: session.patient(),
                history: session.history(),
            };
            let narrated = narrator.patient_line(ctx).await.map_err(SimError::from);
            let narrated = narrated.and_then(|line| {
                session.record_patient_line(line.clone())?;
                Ok(line)
            });
            if let Ok(line) = &narrated {
                self.emit(Event::PatientReplied {
                    timestamp: Utc::now(),
                    session_id,
                    turn: report.turn,
                    line: line.clone(),
                });
            }
            split(narrated.map(Reply::Patient))
        };
        metrics::record_collaborator_duration(NARRATOR, started.elapsed());

        if let Some(error) = &narration_error {
            metrics::record_collaborator_error(NARRATOR);
            warn!(session_id = %session_id, turn = report.turn, %error, "narration failed");
        }

        Ok(TurnOutcome {
            report,
            reply,
            narration_error,
            delta_issues,
        })
    }

    /// Replaces the session with a fresh one.
    pub async fn reset(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.reset();
        metrics::set_current_phase(session.phase());
        self.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            session_id: session.id(),
            patient: *session.patient(),
        });
        session.snapshot()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Runs `f` against the locked session.
    pub async fn inspect<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&*self.session.lock().await)
    }
}

fn split(narrated: Result<Reply, SimError>) -> (Option<Reply>, Option<String>) {
    match narrated {
        Ok(reply) => (Some(reply), None),
        Err(e) => (None, Some(e.to_string())),
    }
}
