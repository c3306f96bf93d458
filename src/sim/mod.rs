//! Simulation state rules
//!
//! Pure, deterministic rules that turn a per-turn score delta into new
//! patient and nurse vectors, a phase, and possibly a terminal result.
//!
//! # Architecture
//!
//! - [`vector`]: Bounded attribute vectors and the shared clamp
//! - [`delta`]: Turn delta and its lenient parser
//! - [`scoring`]: Ordered scoring pipeline over an uncommitted draft
//! - [`phase`]: Phase classification and advisory hints
//! - [`outcome`]: End-of-game adjudication

pub mod delta;
pub mod outcome;
pub mod phase;
pub mod scoring;
pub mod vector;

pub use delta::{DeltaIssue, ParsedDelta, TurnDelta};
pub use outcome::{GameResult, MAX_TURN};
pub use phase::Phase;
pub use scoring::{Scored, ThresholdRule, score};
pub use vector::{NurseState, PatientState, StateVector};
