//! `delirium-sim` - state engine for a delirium-care nursing simulation
//!
//! A nurse talks to a simulated elderly patient with hyperactive delirium.
//! Each utterance is scored by an external interpreter into a per-turn
//! delta; this crate applies that delta to the patient and nurse vectors,
//! classifies the patient's phase, and decides when the game ends. The
//! patient's replies come from an external narrator.

pub mod cli;
pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod scenario;
pub mod sim;
