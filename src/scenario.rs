//! Scenario scripts for offline replays.
//!
//! A script is a YAML document listing nurse utterances together with the
//! delta an interpreter would have produced for each:
//!
//! ```yaml
//! name: calm reorientation
//! turns:
//!   - utterance: "할아버지, 여기는 병원이에요."
//!     delta: { empathy: 3, reorientation: 4, safety_intervention: 1 }
//! ```
//!
//! Deltas are kept as raw values and parsed leniently at replay time, so a
//! script can also describe interpreter replies with missing fields.

use std::path::Path;

use serde::Deserialize;

use crate::config::MAX_CONFIG_SIZE;
use crate::error::{ConfigError, SimError};

/// A parsed scenario script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioScript {
    #[serde(default)]
    pub name: Option<String>,
    pub turns: Vec<ScriptedTurn>,
}

/// One scripted nurse turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedTurn {
    pub utterance: String,
    /// Omitted deltas are an empty mapping: every field missing.
    #[serde(default = "empty_delta")]
    pub delta: serde_json::Value,
}

fn empty_delta() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ScenarioScript {
    /// Reads a script from disk.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file is missing, too large, or does
    /// not match the script schema.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: MAX_CONFIG_SIZE,
            }
            .into());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|message| {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                message,
            }
            .into()
        })
    }

    /// Parses script text.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if the YAML does not match the schema
    /// or the script has no turns.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let script: Self = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
        if script.turns.is_empty() {
            return Err("scenario has no turns".into());
        }
        Ok(script)
    }

    /// Delta payloads in turn order.
    pub fn deltas(&self) -> impl Iterator<Item = serde_json::Value> + '_ {
        self.turns.iter().map(|t| t.delta.clone())
    }
}
