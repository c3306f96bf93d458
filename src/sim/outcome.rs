//! End-of-game adjudication.

use serde::{Deserialize, Serialize};

use super::vector::PatientState;

/// Turn count at which an undecided session times out.
pub const MAX_TURN: u32 = 10;

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    /// Patient calmed and reoriented.
    Success,
    /// Patient escalated past recovery or lost orientation entirely.
    Fail,
    /// Turn limit reached without a decision.
    TimeOver,
}

impl GameResult {
    /// Wire tag of the result (`SUCCESS`, `FAIL`, `TIME_OVER`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
            Self::TimeOver => "TIME_OVER",
        }
    }

    /// Evaluates the clamped patient vector and turn count.
    ///
    /// A decisive state (success, then failure) always preempts a
    /// simultaneous turn-limit expiry. Returns `None` while the game
    /// continues.
    #[must_use]
    pub const fn evaluate(patient: &PatientState, turn: u32) -> Option<Self> {
        if patient.aggression <= 40 && patient.orientation >= 65 && patient.anxiety <= 45 {
            return Some(Self::Success);
        }
        if patient.aggression >= 90 || patient.orientation <= 20 {
            return Some(Self::Fail);
        }
        if turn >= MAX_TURN {
            return Some(Self::TimeOver);
        }
        None
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_continues() {
        assert_eq!(GameResult::evaluate(&PatientState::default(), 0), None);
        assert_eq!(GameResult::evaluate(&PatientState::default(), 9), None);
    }

    #[test]
    fn test_success_bounds_inclusive() {
        assert_eq!(
            GameResult::evaluate(&PatientState::new(65, 45, 40), 1),
            Some(GameResult::Success)
        );
        assert_eq!(GameResult::evaluate(&PatientState::new(64, 45, 40), 1), None);
        assert_eq!(GameResult::evaluate(&PatientState::new(65, 46, 40), 1), None);
        assert_eq!(GameResult::evaluate(&PatientState::new(65, 45, 41), 1), None);
    }

    #[test]
    fn test_fail_on_aggression_or_orientation() {
        assert_eq!(
            GameResult::evaluate(&PatientState::new(50, 50, 90), 1),
            Some(GameResult::Fail)
        );
        assert_eq!(
            GameResult::evaluate(&PatientState::new(20, 50, 50), 1),
            Some(GameResult::Fail)
        );
        assert_eq!(GameResult::evaluate(&PatientState::new(21, 50, 89), 1), None);
    }

    #[test]
    fn test_success_preempts_time_over() {
        assert_eq!(
            GameResult::evaluate(&PatientState::new(80, 20, 10), MAX_TURN),
            Some(GameResult::Success)
        );
    }

    #[test]
    fn test_fail_preempts_time_over() {
        assert_eq!(
            GameResult::evaluate(&PatientState::new(10, 50, 50), MAX_TURN),
            Some(GameResult::Fail)
        );
    }

    #[test]
    fn test_time_over_at_limit() {
        let p = PatientState::default();
        assert_eq!(GameResult::evaluate(&p, MAX_TURN), Some(GameResult::TimeOver));
        assert_eq!(GameResult::evaluate(&p, MAX_TURN + 3), Some(GameResult::TimeOver));
    }

    #[test]
    fn test_wire_tags() {
        assert_eq!(GameResult::TimeOver.to_string(), "TIME_OVER");
        assert_eq!(
            serde_json::to_string(&GameResult::Success).unwrap(),
            "\"SUCCESS\""
        );
        let parsed: GameResult = serde_json::from_str("\"FAIL\"").unwrap();
        assert_eq!(parsed, GameResult::Fail);
    }
}
