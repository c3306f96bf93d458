//! Score application.
//!
//! A turn delta is applied as an ordered pipeline of named, pure steps over
//! a [`Draft`] copy of both vectors. Later steps read the values written by
//! earlier ones, so the order in [`PIPELINE`] is part of the rules. Nothing
//! is written back to the session until the whole pipeline has run, which
//! makes a scored turn all-or-nothing from the caller's view.

use serde::Serialize;

use super::delta::TurnDelta;
use super::vector::{NurseState, PatientState, StateVector};

/// Aggression at or above which unaddressed agitation self-escalates.
///
/// Distinct from the phase-2 cutoff.
pub const ESCALATION_AGGRESSION: i32 = 75;
/// Aggression added by the escalation rule.
pub const ESCALATION_STEP: i32 = 5;
/// Orientation at or above which anxiety eases.
pub const CALMING_ORIENTATION: i32 = 70;
/// Anxiety removed by the orientation calming rule.
pub const ORIENTATION_CALMING_STEP: i32 = 5;
/// Nurse empathy at or above which anxiety eases.
pub const CALMING_EMPATHY: i32 = 65;
/// Anxiety removed by the empathy calming rule.
pub const EMPATHY_CALMING_STEP: i32 = 2;

/// Threshold side effects layered on top of the linear deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdRule {
    /// High aggression without a safety intervention grows further.
    Escalation,
    /// Good orientation reduces anxiety.
    OrientationCalming,
    /// High nurse empathy reduces anxiety.
    EmpathyCalming,
}

impl ThresholdRule {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Escalation => "escalation",
            Self::OrientationCalming => "orientation_calming",
            Self::EmpathyCalming => "empathy_calming",
        }
    }
}

impl std::fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uncommitted copy of both vectors, threaded through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub patient: PatientState,
    pub nurse: NurseState,
    /// Threshold rules that fired, in pipeline order.
    pub fired: Vec<ThresholdRule>,
}

impl Draft {
    #[must_use]
    pub const fn new(patient: PatientState, nurse: NurseState) -> Self {
        Self {
            patient,
            nurse,
            fired: Vec::new(),
        }
    }
}

/// One named transformation of the draft.
#[derive(Clone, Copy)]
pub struct ScoreStep {
    /// Name used in traces and tests.
    pub name: &'static str,
    /// The transformation itself.
    pub apply: fn(Draft, &TurnDelta) -> Draft,
}

impl std::fmt::Debug for ScoreStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The scoring rules, in the order they must run.
pub const PIPELINE: [ScoreStep; 11] = [
    ScoreStep {
        name: "nurse_empathy",
        apply: nurse_empathy,
    },
    ScoreStep {
        name: "nurse_assessment",
        apply: nurse_assessment,
    },
    ScoreStep {
        name: "nurse_safety",
        apply: nurse_safety,
    },
    ScoreStep {
        name: "nurse_problem_solving",
        apply: nurse_problem_solving,
    },
    ScoreStep {
        name: "patient_orientation",
        apply: patient_orientation,
    },
    ScoreStep {
        name: "patient_anxiety",
        apply: patient_anxiety,
    },
    ScoreStep {
        name: "patient_aggression",
        apply: patient_aggression,
    },
    ScoreStep {
        name: "escalation",
        apply: escalation,
    },
    ScoreStep {
        name: "orientation_calming",
        apply: orientation_calming,
    },
    ScoreStep {
        name: "empathy_calming",
        apply: empathy_calming,
    },
    ScoreStep {
        name: "clamp",
        apply: clamp,
    },
];

/// Result of scoring one delta: both vectors, clamped, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    pub patient: PatientState,
    pub nurse: NurseState,
    pub fired: Vec<ThresholdRule>,
}

/// Runs the full pipeline against copies of the given vectors.
#[must_use]
pub fn score(patient: &PatientState, nurse: &NurseState, delta: &TurnDelta) -> Scored {
    let draft = run_steps(&PIPELINE, Draft::new(*patient, *nurse), delta);
    Scored {
        patient: draft.patient,
        nurse: draft.nurse,
        fired: draft.fired,
    }
}

/// Runs a slice of steps in order. Exposed so a prefix of the pipeline can
/// be inspected in isolation.
#[must_use]
pub fn run_steps(steps: &[ScoreStep], draft: Draft, delta: &TurnDelta) -> Draft {
    steps.iter().fold(draft, |d, step| {
        let next = (step.apply)(d, delta);
        tracing::trace!(step = step.name, patient = %next.patient, nurse = %next.nurse, "score step");
        next
    })
}

// ---------------------------------------------------------------------------
// Linear steps
// ---------------------------------------------------------------------------

fn nurse_empathy(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.nurse.empathy = d.nurse.empathy.saturating_add(delta.empathy);
    d
}

fn nurse_assessment(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.nurse.assessment = d.nurse.assessment.saturating_add(delta.cam_assessment);
    d
}

fn nurse_safety(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.nurse.safety = d.nurse.safety.saturating_add(delta.safety_intervention);
    d
}

// Sedative requests count against problem solving.
fn nurse_problem_solving(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.nurse.problem_solving = d.nurse.problem_solving.saturating_sub(delta.sedative_request);
    d
}

fn patient_orientation(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.patient.orientation = d.patient.orientation.saturating_add(delta.reorientation);
    d
}

// Empathy lowers anxiety: same delta, opposite sign.
fn patient_anxiety(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.patient.anxiety = d.patient.anxiety.saturating_sub(delta.empathy);
    d
}

fn patient_aggression(mut d: Draft, delta: &TurnDelta) -> Draft {
    d.patient.aggression = d.patient.aggression.saturating_sub(delta.safety_intervention);
    d
}

// ---------------------------------------------------------------------------
// Threshold steps (read post-linear values, run before the clamp)
// ---------------------------------------------------------------------------

fn escalation(mut d: Draft, delta: &TurnDelta) -> Draft {
    if d.patient.aggression >= ESCALATION_AGGRESSION && delta.safety_intervention <= 0 {
        d.patient.aggression = d.patient.aggression.saturating_add(ESCALATION_STEP);
        d.fired.push(ThresholdRule::Escalation);
    }
    d
}

fn orientation_calming(mut d: Draft, _delta: &TurnDelta) -> Draft {
    if d.patient.orientation >= CALMING_ORIENTATION {
        d.patient.anxiety = d.patient.anxiety.saturating_sub(ORIENTATION_CALMING_STEP);
        d.fired.push(ThresholdRule::OrientationCalming);
    }
    d
}

fn empathy_calming(mut d: Draft, _delta: &TurnDelta) -> Draft {
    if d.nurse.empathy >= CALMING_EMPATHY {
        d.patient.anxiety = d.patient.anxiety.saturating_sub(EMPATHY_CALMING_STEP);
        d.fired.push(ThresholdRule::EmpathyCalming);
    }
    d
}

fn clamp(mut d: Draft, _delta: &TurnDelta) -> Draft {
    d.patient.clamp();
    d.nurse.clamp();
    d
}
