//! Configuration schema types.
//!
//! Every field has a default, so an empty mapping (or a missing section)
//! yields a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Chat-completions endpoint used by the interactive game.
    pub llm: LlmConfig,

    /// Presentation settings.
    pub game: GameConfig,
}

/// OpenAI-compatible endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    pub model: String,

    /// Name of the environment variable holding the API key. The key
    /// itself never appears in the file.
    pub api_key_env: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Sampling for the utterance analyzer.
    pub interpreter: CallParams,

    /// Sampling for in-character patient lines.
    pub narrator: CallParams,

    /// Sampling for the closing line.
    pub ending: CallParams,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_ms: 30_000,
            interpreter: CallParams::INTERPRETER,
            narrator: CallParams::NARRATOR,
            ending: CallParams::ENDING,
        }
    }
}

/// Sampling parameters for one kind of call. Both fields are required
/// when the section is present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CallParams {
    /// Deterministic scoring.
    pub const INTERPRETER: Self = Self {
        temperature: 0.0,
        max_tokens: 150,
    };

    pub const NARRATOR: Self = Self {
        temperature: 0.4,
        max_tokens: 40,
    };

    pub const ENDING: Self = Self {
        temperature: 0.6,
        max_tokens: 30,
    };
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Line shown when a session starts. Not part of the conversation
    /// history.
    pub opening_line: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            opening_line: "여기가 어디야… 집에 가야 하는데…".into(),
        }
    }
}
