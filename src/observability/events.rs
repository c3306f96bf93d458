//! JSONL event stream describing a session as it unfolds.
//!
//! One JSON object per line, each carrying a `sequence` number. Sequence
//! numbers are assigned under the writer lock, so line order and sequence
//! order always agree.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::sim::{GameResult, NurseState, PatientState, Phase, ThresholdRule};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a simulation session.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A fresh session was created (or an old one reset).
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session_id: Uuid,
        /// Starting patient vector.
        patient: PatientState,
    },

    /// A nurse turn was scored.
    TurnApplied {
        timestamp: DateTime<Utc>,
        session_id: Uuid,
        /// Turn number after increment (1-based).
        turn: u32,
        phase: Phase,
        patient: PatientState,
        nurse: NurseState,
        /// Threshold rules that fired this turn.
        fired: Vec<ThresholdRule>,
        /// Delta fields that were defaulted to zero.
        delta_issues: Vec<String>,
    },

    /// The narrator produced an in-character patient line.
    PatientReplied {
        timestamp: DateTime<Utc>,
        session_id: Uuid,
        turn: u32,
        line: String,
    },

    /// The session reached a terminal result.
    SessionEnded {
        timestamp: DateTime<Utc>,
        session_id: Uuid,
        turn: u32,
        result: GameResult,
        /// Ending narration, if the narrator produced one.
        ending: Option<String>,
    },
}

/// One line of the stream: the event with its position flattened in.
#[derive(Debug, Serialize)]
struct Sequenced<'a> {
    sequence: u64,
    #[serde(flatten)]
    event: &'a Event,
}

struct Sink {
    out: BufWriter<Box<dyn Write + Send>>,
    next_sequence: u64,
}

/// Writes [`Event`]s as JSONL, flushing after every line.
///
/// Emitting never fails the caller: an event that cannot be written is
/// dropped with a debug log.
pub struct EventEmitter {
    sink: Mutex<Sink>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter").finish_non_exhaustive()
    }
}

impl EventEmitter {
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(Sink {
                out: BufWriter::new(out),
                next_sequence: 0,
            }),
        }
    }

    /// Stream on stderr, next to the logs. Used by `play` when no events
    /// file is given.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Stream into a newly created (or truncated) file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from creating `path`.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(Box::new(std::fs::File::create(path)?)))
    }

    pub fn emit(&self, event: Event) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let line = Sequenced {
            sequence: sink.next_sequence,
            event: &event,
        };
        let written = serde_json::to_string(&line)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                writeln!(sink.out, "{json}")?;
                sink.out.flush()
            });
        match written {
            Ok(()) => sink.next_sequence += 1,
            Err(e) => tracing::debug!(error = %e, "dropped event"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
