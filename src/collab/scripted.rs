//! Offline collaborators for replays and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorError;
use crate::sim::{GameResult, ParsedDelta, PatientState, Phase, TurnDelta};

use super::{Interpreter, NarrationContext, Narrator};

/// Serves pre-recorded delta payloads in order, ignoring the utterance.
///
/// Payloads go through the same lenient parse as a model reply, so a
/// script can exercise missing or non-numeric fields.
#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    queue: Mutex<VecDeque<Value>>,
    served: AtomicUsize,
}

impl ScriptedInterpreter {
    #[must_use]
    pub fn new(payloads: impl IntoIterator<Item = Value>) -> Self {
        Self {
            queue: Mutex::new(payloads.into_iter().collect()),
            served: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor from already-typed deltas.
    #[must_use]
    pub fn from_deltas(deltas: impl IntoIterator<Item = TurnDelta>) -> Self {
        Self::new(
            deltas
                .into_iter()
                .map(|d| serde_json::to_value(d).unwrap_or(Value::Null)),
        )
    }

    /// Payloads not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn interpret(
        &self,
        _utterance: &str,
        _patient: &PatientState,
    ) -> Result<ParsedDelta, CollaboratorError> {
        let next = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let payload =
            next.ok_or_else(|| CollaboratorError::Exhausted(self.served.load(Ordering::SeqCst)))?;
        self.served.fetch_add(1, Ordering::SeqCst);
        Ok(TurnDelta::from_value(&payload)?)
    }
}

/// Fixed patient lines per phase and per result.
#[derive(Debug, Clone)]
pub struct StaticNarrator {
    disoriented: String,
    agitated: String,
    stabilizing: String,
    success: String,
    fail: String,
    time_over: String,
}

impl StaticNarrator {
    /// Line voiced for `phase` on an ongoing session.
    #[must_use]
    pub fn line_for(&self, phase: Phase) -> &str {
        match phase {
            Phase::Disoriented => &self.disoriented,
            Phase::Agitated => &self.agitated,
            Phase::Stabilizing => &self.stabilizing,
        }
    }

    /// Ending voiced for `result`.
    #[must_use]
    pub fn ending_for(&self, result: GameResult) -> &str {
        match result {
            GameResult::Success => &self.success,
            GameResult::Fail => &self.fail,
            GameResult::TimeOver => &self.time_over,
        }
    }
}

impl Default for StaticNarrator {
    fn default() -> Self {
        Self {
            disoriented: "여기가 어디요? 집에 가야 하는데...".into(),
            agitated: "나 건드리지 마!".into(),
            stabilizing: "그래요... 좀 낫네.".into(),
            success: "이제 좀 알겠네. 고마워요.".into(),
            fail: "다들 저리 가! 집에 갈 거야!".into(),
            time_over: "아직도 여기가 어딘지 모르겠어...".into(),
        }
    }
}

#[async_trait]
impl Narrator for StaticNarrator {
    async fn patient_line(&self, ctx: NarrationContext<'_>) -> Result<String, CollaboratorError> {
        Ok(self.line_for(ctx.phase).to_owned())
    }

    async fn ending_line(&self, result: GameResult) -> Result<String, CollaboratorError> {
        Ok(self.ending_for(result).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::GameError;

    #[tokio::test]
    async fn serves_in_order_then_exhausts() {
        let interp = ScriptedInterpreter::new([
            json!({"empathy": 2, "reorientation": 1, "cam_assessment": 0,
                   "sedative_request": 0, "safety_intervention": 0}),
            json!({"empathy": "3"}),
        ]);
        let patient = PatientState::default();

        let first = interp.interpret("a", &patient).await.unwrap();
        assert_eq!(first.delta.empathy, 2);
        assert!(first.issues.is_empty());

        let second = interp.interpret("b", &patient).await.unwrap();
        assert_eq!(second.delta.empathy, 3);
        assert_eq!(second.issues.len(), 4);
        assert_eq!(interp.remaining(), 0);

        let err = interp.interpret("c", &patient).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Exhausted(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_each_get_one_payload() {
        let interp = std::sync::Arc::new(ScriptedInterpreter::from_deltas(
            (1..=8).map(|empathy| TurnDelta {
                empathy,
                ..TurnDelta::default()
            }),
        ));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let interp = std::sync::Arc::clone(&interp);
            tasks.push(tokio::spawn(async move {
                interp
                    .interpret("x", &PatientState::default())
                    .await
                    .unwrap()
                    .delta
                    .empathy
            }));
        }
        let mut seen = Vec::new();
        for task in tasks {
            seen.push(task.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=8).collect::<Vec<_>>());

        let err = interp
            .interpret("x", &PatientState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Exhausted(8)));
    }

    #[tokio::test]
    async fn non_object_payload_is_malformed() {
        let interp = ScriptedInterpreter::new([json!([1, 2, 3])]);
        let err = interp
            .interpret("x", &PatientState::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::Delta(GameError::MalformedDelta(_))
        ));
    }

    #[tokio::test]
    async fn from_deltas_round_trips_typed_values() {
        let delta = TurnDelta {
            safety_intervention: 4,
            ..TurnDelta::default()
        };
        let interp = ScriptedInterpreter::from_deltas([delta]);
        let parsed = interp
            .interpret("x", &PatientState::default())
            .await
            .unwrap();
        assert_eq!(parsed.delta, delta);
    }

    #[tokio::test]
    async fn static_narrator_voices_phase_and_result() {
        let narrator = StaticNarrator::default();
        let patient = PatientState::new(40, 60, 80);
        let line = narrator
            .patient_line(NarrationContext {
                phase: Phase::Agitated,
                patient: &patient,
                history: &[],
            })
            .await
            .unwrap();
        assert_eq!(line, "나 건드리지 마!");
        assert_eq!(
            narrator.ending_line(GameResult::TimeOver).await.unwrap(),
            narrator.ending_for(GameResult::TimeOver)
        );
    }
}
