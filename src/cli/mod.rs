//! Command-line interface
//!
//! Argument definitions and command handlers for the `delirium-sim`
//! binary.

pub mod args;
pub mod commands;
