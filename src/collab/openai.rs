//! OpenAI-compatible chat-completions collaborator.
//!
//! One client serves both roles: it scores utterances with the analyzer
//! prompt and voices the patient with the role-play and ending prompts.
//! Every call is bounded by the configured timeout and never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::schema::{CallParams, LlmConfig};
use crate::error::CollaboratorError;
use crate::sim::{GameResult, ParsedDelta, PatientState, TurnDelta};

use super::prompts::{self, ChatMessage};
use super::{Interpreter, NarrationContext, Narrator};

/// Upper bound on a completion response body.
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client implementing [`Interpreter`] and [`Narrator`].
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
    interpreter: CallParams,
    narrator: CallParams,
    ending: CallParams,
}

// Keeps the API key out of debug output.
impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Builds a client from config, reading the API key from the
    /// environment variable named by `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::MissingApiKey`] if the variable is unset
    /// or empty, and [`CollaboratorError::Network`] if the HTTP client
    /// cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self, CollaboratorError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CollaboratorError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    /// Builds a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Network`] if the HTTP client cannot be
    /// built.
    pub fn with_api_key(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: completions_url(&config.base_url),
            model: config.model.clone(),
            api_key: api_key.into(),
            timeout: Duration::from_millis(config.timeout_ms),
            interpreter: config.interpreter,
            narrator: config.narrator,
            ending: config.ending,
        })
    }

    /// Chat-completions endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: CallParams,
    ) -> Result<String, CollaboratorError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        debug!(endpoint = %self.endpoint, model = %self.model, messages = messages.len(), "requesting completion");

        let response = tokio::time::timeout(
            self.timeout,
            self.http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| CollaboratorError::Timeout(timeout_ms))?
        .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::HttpStatus(status.as_u16()));
        }

        let bytes = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| CollaboratorError::Timeout(timeout_ms))?
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if bytes.len() > MAX_RESPONSE_SIZE {
            return Err(CollaboratorError::InvalidResponse(format!(
                "response body exceeds {MAX_RESPONSE_SIZE} byte limit"
            )));
        }

        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::InvalidResponse("no completion choices".into()))
    }
}

#[async_trait]
impl Interpreter for OpenAiClient {
    async fn interpret(
        &self,
        utterance: &str,
        patient: &PatientState,
    ) -> Result<ParsedDelta, CollaboratorError> {
        let messages = [ChatMessage::user(prompts::analyzer_prompt(utterance, patient))];
        let reply = self.complete(&messages, self.interpreter).await?;
        Ok(TurnDelta::from_reply(&reply)?)
    }
}

#[async_trait]
impl Narrator for OpenAiClient {
    async fn patient_line(&self, ctx: NarrationContext<'_>) -> Result<String, CollaboratorError> {
        let messages = prompts::patient_messages(&ctx);
        let reply = self.complete(&messages, self.narrator).await?;
        non_empty(prompts::normalize_reply(&reply), "narrator")
    }

    async fn ending_line(&self, result: GameResult) -> Result<String, CollaboratorError> {
        let messages = [ChatMessage::user(prompts::ending_prompt(result))];
        let reply = self.complete(&messages, self.ending).await?;
        non_empty(prompts::normalize_reply(&reply), "ending narrator")
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn non_empty(line: String, who: &'static str) -> Result<String, CollaboratorError> {
    if line.is_empty() {
        Err(CollaboratorError::EmptyReply(who))
    } else {
        Ok(line)
    }
}
