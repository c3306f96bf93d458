//! Phase classification and advisory hints.
//!
//! The phase is recomputed from the clamped patient vector after every
//! turn. There is no hysteresis: the phase may flip back and forth as the
//! patient crosses thresholds.

use serde::{Serialize, Serializer};

use super::vector::PatientState;

/// Aggression at or above which the patient is classified as agitated.
///
/// Distinct from the self-escalation cutoff used while scoring.
pub const AGITATED_AGGRESSION: i32 = 68;

/// Minimum orientation for the stabilizing phase.
pub const STABILIZING_ORIENTATION: i32 = 60;

/// Maximum anxiety for the stabilizing phase.
pub const STABILIZING_ANXIETY: i32 = 50;

/// Coarse behavioral regime of the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Phase 1: disoriented, questioning, restless.
    #[default]
    Disoriented,
    /// Phase 2: irritable, defensive, reactive.
    Agitated,
    /// Phase 3: calmer and more receptive.
    Stabilizing,
}

impl Phase {
    /// Every phase, in phase-number order.
    pub const ALL: [Self; 3] = [Self::Disoriented, Self::Agitated, Self::Stabilizing];

    /// Classifies a clamped patient vector. First match wins:
    /// agitation, then stabilization, otherwise disorientation.
    #[must_use]
    pub const fn select(patient: &PatientState) -> Self {
        if patient.aggression >= AGITATED_AGGRESSION {
            Self::Agitated
        } else if patient.orientation >= STABILIZING_ORIENTATION
            && patient.anxiety <= STABILIZING_ANXIETY
        {
            Self::Stabilizing
        } else {
            Self::Disoriented
        }
    }

    /// Numeric phase as shown to the player (1, 2 or 3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Disoriented => 1,
            Self::Agitated => 2,
            Self::Stabilizing => 3,
        }
    }

    /// Fixed advisory string for this phase.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Disoriented => "환자는 지남력 저하 상태입니다. 적절한 중재를 제공하세요.",
            Self::Agitated => "환자가 과자극 상태입니다. 부드러운 문자으로 접근하세요.",
            Self::Stabilizing => "환자가 안정을 찾고 있습니다. 따뜻한 말로 환자에게 다가가세요.",
        }
    }

    /// Short behavior guideline used when prompting the narrator.
    #[must_use]
    pub const fn behavior(self) -> &'static str {
        match self {
            Self::Disoriented => "confused, questioning, restless",
            Self::Agitated => "irritable, defensive, reactive",
            Self::Stabilizing => "slightly calmer, more receptive",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

// Serialized as the bare phase number so reports read `"phase": 2`.
impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_patient_is_disoriented() {
        assert_eq!(Phase::select(&PatientState::default()), Phase::Disoriented);
    }

    #[test]
    fn test_agitation_threshold_inclusive() {
        assert_eq!(Phase::select(&PatientState::new(50, 60, 68)), Phase::Agitated);
        assert_eq!(Phase::select(&PatientState::new(50, 60, 67)), Phase::Disoriented);
    }

    #[test]
    fn test_agitation_beats_stabilization() {
        // Satisfies both rules; aggression is checked first
        let p = PatientState::new(90, 10, 70);
        assert_eq!(Phase::select(&p), Phase::Agitated);
    }

    #[test]
    fn test_stabilizing_bounds_inclusive() {
        assert_eq!(Phase::select(&PatientState::new(60, 50, 0)), Phase::Stabilizing);
        assert_eq!(Phase::select(&PatientState::new(59, 50, 0)), Phase::Disoriented);
        assert_eq!(Phase::select(&PatientState::new(60, 51, 0)), Phase::Disoriented);
    }

    #[test]
    fn test_all_is_in_number_order() {
        let numbers: Vec<u8> = Phase::ALL.iter().map(|p| p.number()).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(Phase::Disoriented.number(), 1);
        assert_eq!(Phase::Agitated.number(), 2);
        assert_eq!(Phase::Stabilizing.number(), 3);
        assert_eq!(Phase::Agitated.to_string(), "2");
    }

    #[test]
    fn test_hint_text_per_phase() {
        assert_eq!(
            Phase::Disoriented.hint(),
            "환자는 지남력 저하 상태입니다. 적절한 중재를 제공하세요."
        );
        assert_eq!(
            Phase::Agitated.hint(),
            "환자가 과자극 상태입니다. 부드러운 문자으로 접근하세요."
        );
        assert_eq!(
            Phase::Stabilizing.hint(),
            "환자가 안정을 찾고 있습니다. 따뜻한 말로 환자에게 다가가세요."
        );
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Phase::Stabilizing).unwrap(), "3");
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn select_is_pure(o in 0i32..=100, a in 0i32..=100, g in 0i32..=100) {
                let p = PatientState::new(o, a, g);
                let copy = PatientState::new(o, a, g);
                prop_assert_eq!(Phase::select(&p), Phase::select(&copy));
            }
        }
    }
}
