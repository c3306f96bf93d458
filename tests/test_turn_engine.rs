//! End-to-end properties of the turn engine, driven through the public
//! library API.

use delirium_sim::engine::{Role, Session, SessionStatus};
use delirium_sim::error::GameError;
use delirium_sim::sim::{
    GameResult, MAX_TURN, NurseState, PatientState, Phase, StateVector, TurnDelta, score,
};
use proptest::prelude::*;

fn safety(value: i32) -> TurnDelta {
    TurnDelta {
        safety_intervention: value,
        ..TurnDelta::default()
    }
}

#[test]
fn fresh_session_is_disoriented() {
    let session = Session::new();
    assert_eq!(session.phase(), Phase::Disoriented);
    assert_eq!(session.turn(), 0);
    assert_eq!(session.result(), None);
    assert_eq!(session.hint(), Phase::Disoriented.hint());
}

#[test]
fn single_negative_safety_turn_agitates_without_escalation() {
    let mut session = Session::new();
    let report = session.apply_turn("가만히 계세요", &safety(-5)).unwrap();
    assert_eq!(report.patient.aggression, 70);
    assert_eq!(report.phase, Phase::Agitated);
    assert!(report.fired.is_empty());
    assert_eq!(report.result, None);
}

#[test]
fn repeated_restraint_fails_when_aggression_reaches_ninety() {
    let mut session = Session::new();
    let mut results = Vec::new();
    while session.result().is_none() {
        let report = session.apply_turn("...", &safety(-5)).unwrap();
        results.push((report.patient.aggression, report.result));
    }
    assert_eq!(
        results,
        [(70, None), (80, None), (90, Some(GameResult::Fail))]
    );
    assert_eq!(session.status(), SessionStatus::Terminal(GameResult::Fail));
}

#[test]
fn ten_neutral_turns_time_out() {
    let mut session = Session::new();
    for turn in 1..=MAX_TURN {
        let report = session.apply_turn("...", &TurnDelta::default()).unwrap();
        assert_eq!(report.turn, turn);
        let expected = (turn == MAX_TURN).then_some(GameResult::TimeOver);
        assert_eq!(report.result, expected);
    }
    assert_eq!(session.patient(), &PatientState::default());
}

#[test]
fn finished_session_rejects_turns_without_mutation() {
    let mut session = Session::new();
    for _ in 0..MAX_TURN {
        session.apply_turn("...", &TurnDelta::default()).unwrap();
    }
    let before = session.snapshot();

    let err = session.apply_turn("again", &safety(5)).unwrap_err();
    assert_eq!(
        err,
        GameError::GameOver {
            result: GameResult::TimeOver,
            turn: MAX_TURN
        }
    );
    assert_eq!(session.snapshot(), before);
}

#[test]
fn history_alternates_user_and_patient() {
    let mut session = Session::new();
    session.apply_turn("안녕하세요", &TurnDelta::default()).unwrap();
    session.record_patient_line("누구요?").unwrap();
    session.apply_turn("간호사예요", &TurnDelta::default()).unwrap();

    let roles: Vec<Role> = session.history().iter().map(|e| e.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User]);
    assert_eq!(session.history()[2].content, "간호사예요");
}

fn delta_strategy() -> impl Strategy<Value = TurnDelta> {
    (
        -50i32..=50,
        -50i32..=50,
        -50i32..=50,
        -50i32..=50,
        -50i32..=50,
    )
        .prop_map(|(e, r, c, s, i)| TurnDelta {
            empathy: e,
            reorientation: r,
            cam_assessment: c,
            sedative_request: s,
            safety_intervention: i,
        })
}

proptest! {
    #[test]
    fn vectors_stay_bounded_and_phase_tracks_state(
        deltas in prop::collection::vec(delta_strategy(), 1..15)
    ) {
        let mut session = Session::new();
        let mut last_turn = 0;
        for delta in &deltas {
            match session.apply_turn("x", delta) {
                Ok(report) => {
                    prop_assert!(report.patient.is_bounded());
                    prop_assert!(report.nurse.is_bounded());
                    prop_assert_eq!(report.turn, last_turn + 1);
                    prop_assert_eq!(report.phase, Phase::select(&report.patient));
                    prop_assert_eq!(report.result, GameResult::evaluate(&report.patient, report.turn));
                    last_turn = report.turn;
                }
                Err(GameError::GameOver { turn, .. }) => {
                    prop_assert!(session.is_terminal());
                    prop_assert_eq!(turn, last_turn);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }
        prop_assert!(session.turn() <= MAX_TURN);
    }

    #[test]
    fn scoring_is_pure(
        o in 0i32..=100, a in 0i32..=100, g in 0i32..=100,
        delta in delta_strategy()
    ) {
        let patient = PatientState::new(o, a, g);
        let nurse = NurseState::default();
        let first = score(&patient, &nurse, &delta);
        let second = score(&patient, &nurse, &delta);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(patient, PatientState::new(o, a, g));
    }

    #[test]
    fn extreme_deltas_never_overflow(e in any::<i32>(), r in any::<i32>(), s in any::<i32>()) {
        let delta = TurnDelta {
            empathy: e,
            reorientation: r,
            safety_intervention: s,
            ..TurnDelta::default()
        };
        let scored = score(&PatientState::default(), &NurseState::default(), &delta);
        prop_assert!(scored.patient.is_bounded());
        prop_assert!(scored.nurse.is_bounded());
    }
}
