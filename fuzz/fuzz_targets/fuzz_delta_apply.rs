#![no_main]

use delirium_sim::engine::Session;
use delirium_sim::sim::{MAX_TURN, Phase, StateVector, TurnDelta};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Each line is one interpreter reply.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut session = Session::new();
    for reply in text.lines() {
        let Ok(parsed) = TurnDelta::from_reply(reply) else {
            continue;
        };
        match session.apply_turn(reply, &parsed.delta) {
            Ok(report) => {
                assert!(report.patient.is_bounded());
                assert!(report.nurse.is_bounded());
                assert_eq!(report.phase, Phase::select(&report.patient));
                assert!(report.turn <= MAX_TURN);
            }
            Err(_) => assert!(session.is_terminal()),
        }
    }
});
