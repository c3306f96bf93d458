//! Turn engine
//!
//! [`Session`] owns the state machine for one simulation run and is fully
//! synchronous. [`SessionHandle`] wraps it for async callers: it serializes
//! turns, drives the interpreter and narrator, and reports each turn to the
//! logs, metrics and event stream.

pub mod handle;
pub mod session;

pub use handle::{Reply, SessionHandle, TurnOutcome};
pub use session::{
    HistoryEntry, Role, Session, SessionSnapshot, SessionStatus, TurnReport,
};
