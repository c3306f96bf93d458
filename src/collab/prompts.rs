//! Prompt construction and reply normalization for chat-completion
//! collaborators.

use serde::Serialize;

use crate::sim::{GameResult, PatientState, Phase};

use super::NarrationContext;

/// One chat-completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Prompt asking the model to score a nurse utterance as a JSON object
/// with integer values in `-5..=5`.
#[must_use]
pub fn analyzer_prompt(utterance: &str, patient: &PatientState) -> String {
    format!(
        "You are a clinical interaction analyzer.\n\
         Return ONLY valid JSON.\n\
         \n\
         For each category assign integer score -5 to +5.\n\
         \n\
         Categories:\n\
         - empathy\n\
         - reorientation\n\
         - cam_assessment\n\
         - sedative_request\n\
         - safety_intervention\n\
         \n\
         Nurse statement:\n\
         \"{utterance}\"\n\
         \n\
         Current patient state:\n\
         {{\"orientation\": {}, \"anxiety\": {}, \"aggression\": {}}}\n",
        patient.orientation, patient.anxiety, patient.aggression
    )
}

/// System prompt that casts the model as the patient.
#[must_use]
pub fn patient_system_prompt(phase: Phase, patient: &PatientState) -> String {
    format!(
        "You are roleplaying as a 78-year-old hospitalized male patient with hyperactive delirium.\n\
         \n\
         Rules:\n\
         - Speak naturally like an elderly Korean man.\n\
         - Do NOT explain your condition.\n\
         - Do NOT say you are confused or anxious.\n\
         - Only speak what the patient would say.\n\
         - One short sentence only (max 10 words).\n\
         - Always use correct Korean spacing.\n\
         \n\
         Tone examples:\n\
         - \"여기가 어디요?\"\n\
         - \"집에 가야 하는데...\"\n\
         - \"저 사람 누구요?\"\n\
         - \"나 건드리지 마!\"\n\
         \n\
         Current Phase: {number}\n\
         \n\
         Phase behavior guideline:\n\
         - Phase 1 → {p1}\n\
         - Phase 2 → {p2}\n\
         - Phase 3 → {p3}\n\
         \n\
         Current state:\n\
         Orientation: {orientation}\n\
         Anxiety: {anxiety}\n\
         Aggression: {aggression}\n\
         \n\
         Respond with dialogue only.\n",
        number = phase.number(),
        p1 = Phase::Disoriented.behavior(),
        p2 = Phase::Agitated.behavior(),
        p3 = Phase::Stabilizing.behavior(),
        orientation = patient.orientation,
        anxiety = patient.anxiety,
        aggression = patient.aggression,
    )
}

/// Full message list for a patient line: the system prompt followed by
/// the conversation history.
#[must_use]
pub fn patient_messages(ctx: &NarrationContext<'_>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(ctx.history.len() + 1);
    messages.push(ChatMessage::system(patient_system_prompt(ctx.phase, ctx.patient)));
    messages.extend(ctx.history.iter().map(|entry| ChatMessage {
        role: entry.role.as_str(),
        content: entry.content.clone(),
    }));
    messages
}

/// Prompt for the closing line of a finished session.
#[must_use]
pub fn ending_prompt(result: GameResult) -> String {
    format!(
        "You are a delirium patient.\n\
         \n\
         Game result: {result}\n\
         \n\
         If SUCCESS → patient feels calmer and oriented.\n\
         If FAIL → patient is agitated and confused.\n\
         If TIME_OVER → patient is still unstable.\n\
         \n\
         Respond in ONE short Korean sentence.\n"
    )
}

/// Trims a reply and collapses every whitespace run to a single space.
#[must_use]
pub fn normalize_reply(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
