//! Configuration module
//!
//! Loading and validation of the `delirium-sim` YAML configuration: the
//! model endpoint used by the interactive game and the game's presentation
//! settings.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, MAX_CONFIG_SIZE};
pub use schema::{CallParams, GameConfig, LlmConfig, SimConfig};
pub use validation::{ValidationResult, Validator};
