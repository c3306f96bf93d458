//! Bounded attribute vectors for the patient and the nurse.
//!
//! Both vectors hold plain `i32` attributes that are allowed to leave the
//! `[0, 100]` band while a turn is being scored; [`StateVector::clamp`]
//! brings them back before anything reads them for phase or outcome
//! decisions.

use serde::{Deserialize, Serialize};

/// Lower bound of every attribute after clamping.
pub const ATTR_MIN: i32 = 0;

/// Upper bound of every attribute after clamping.
pub const ATTR_MAX: i32 = 100;

/// Clamps a single attribute value into `[ATTR_MIN, ATTR_MAX]`.
#[must_use]
pub const fn clamp_value(v: i32) -> i32 {
    if v < ATTR_MIN {
        ATTR_MIN
    } else if v > ATTR_MAX {
        ATTR_MAX
    } else {
        v
    }
}

/// A named set of integer attributes sharing the `[0, 100]` bound.
pub trait StateVector {
    /// Attribute names and current values, in declaration order.
    fn attributes(&self) -> Vec<(&'static str, i32)>;

    /// Mutable references to every attribute.
    fn attributes_mut(&mut self) -> Vec<&mut i32>;

    /// Clamps every attribute into `[0, 100]` in place. Idempotent.
    fn clamp(&mut self) {
        for v in self.attributes_mut() {
            *v = clamp_value(*v);
        }
    }

    /// Returns `true` when every attribute is within `[0, 100]`.
    fn is_bounded(&self) -> bool {
        self.attributes()
            .iter()
            .all(|(_, v)| (ATTR_MIN..=ATTR_MAX).contains(v))
    }
}

/// Cognitive and affective condition of the simulated patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientState {
    /// Orientation to time, place and person.
    pub orientation: i32,
    /// Anxiety level.
    pub anxiety: i32,
    /// Aggression level.
    pub aggression: i32,
}

impl PatientState {
    /// Initial orientation of a fresh session.
    pub const INITIAL_ORIENTATION: i32 = 50;
    /// Initial anxiety of a fresh session.
    pub const INITIAL_ANXIETY: i32 = 60;
    /// Initial aggression of a fresh session.
    pub const INITIAL_AGGRESSION: i32 = 65;

    /// Creates a patient vector with explicit values (not clamped).
    #[must_use]
    pub const fn new(orientation: i32, anxiety: i32, aggression: i32) -> Self {
        Self {
            orientation,
            anxiety,
            aggression,
        }
    }
}

impl Default for PatientState {
    fn default() -> Self {
        Self::new(
            Self::INITIAL_ORIENTATION,
            Self::INITIAL_ANXIETY,
            Self::INITIAL_AGGRESSION,
        )
    }
}

impl StateVector for PatientState {
    fn attributes(&self) -> Vec<(&'static str, i32)> {
        vec![
            ("orientation", self.orientation),
            ("anxiety", self.anxiety),
            ("aggression", self.aggression),
        ]
    }

    fn attributes_mut(&mut self) -> Vec<&mut i32> {
        vec![&mut self.orientation, &mut self.anxiety, &mut self.aggression]
    }
}

impl std::fmt::Display for PatientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "orientation={} anxiety={} aggression={}",
            self.orientation, self.anxiety, self.aggression
        )
    }
}

/// Accumulated skill signal of the player.
///
/// Only `empathy` feeds back into the patient (calming rule B). The other
/// attributes are a scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NurseState {
    pub empathy: i32,
    pub problem_solving: i32,
    pub assessment: i32,
    pub safety: i32,
    pub communication: i32,
}

impl NurseState {
    /// Initial value of every nurse attribute.
    pub const INITIAL_VALUE: i32 = 50;
}

impl Default for NurseState {
    fn default() -> Self {
        Self {
            empathy: Self::INITIAL_VALUE,
            problem_solving: Self::INITIAL_VALUE,
            assessment: Self::INITIAL_VALUE,
            safety: Self::INITIAL_VALUE,
            communication: Self::INITIAL_VALUE,
        }
    }
}

impl StateVector for NurseState {
    fn attributes(&self) -> Vec<(&'static str, i32)> {
        vec![
            ("empathy", self.empathy),
            ("problem_solving", self.problem_solving),
            ("assessment", self.assessment),
            ("safety", self.safety),
            ("communication", self.communication),
        ]
    }

    fn attributes_mut(&mut self) -> Vec<&mut i32> {
        vec![
            &mut self.empathy,
            &mut self.problem_solving,
            &mut self.assessment,
            &mut self.safety,
            &mut self.communication,
        ]
    }
}

impl std::fmt::Display for NurseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "empathy={} problem_solving={} assessment={} safety={} communication={}",
            self.empathy, self.problem_solving, self.assessment, self.safety, self.communication
        )
    }
}
