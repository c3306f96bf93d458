mod common;

use common::{fixture, run_cli, stderr, stdout, stdout_json};

#[test]
fn replay_calm_script_succeeds_on_turn_five() {
    let output = run_cli(&["replay", &fixture("calm_reorientation.yaml"), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["name"], "calm reorientation");
    assert_eq!(report["result"], "SUCCESS");
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["turns"].as_array().unwrap().len(), 5);
    assert_eq!(report["final"]["turn"], 5);
    assert_eq!(report["final"]["patient"]["orientation"], 75);
    assert_eq!(report["final"]["patient"]["anxiety"], 19);
    assert_eq!(report["final"]["patient"]["aggression"], 40);
    assert_eq!(report["final"]["phase"], 3);

    let last = &report["turns"][4];
    assert_eq!(last["reply"]["kind"], "ending");
    assert_eq!(
        last["report"]["fired"],
        serde_json::json!(["orientation_calming", "empathy_calming"])
    );
}

#[test]
fn replay_escalation_fails_on_turn_three() {
    let output = run_cli(&["replay", &fixture("restraint_escalation.yaml"), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["result"], "FAIL");
    assert_eq!(report["skipped"], 0);

    let aggression: Vec<i64> = report["turns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["report"]["patient"]["aggression"].as_i64().unwrap())
        .collect();
    assert_eq!(aggression, [70, 80, 90]);
    assert_eq!(report["turns"][0]["report"]["phase"], 2);
    assert_eq!(report["final"]["nurse"]["problem_solving"], 45);
}

#[test]
fn replay_small_talk_times_out() {
    let output = run_cli(&["replay", &fixture("small_talk.yaml")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.starts_with("scenario: small talk\n"));
    assert!(text.contains("-- turn 10/10 --"));
    assert!(!text.contains("-- turn 11/10 --"));
    assert!(text.contains("== TIME_OVER"));
    assert!(text.trim_end().ends_with("result: TIME_OVER after 10 turns (1 skipped)"));
}

#[test]
fn replay_writes_event_stream() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = run_cli(&[
        "replay",
        &fixture("restraint_escalation.yaml"),
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&events)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let types: Vec<&str> = lines.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        [
            "SessionStarted",
            "TurnApplied",
            "PatientReplied",
            "TurnApplied",
            "PatientReplied",
            "TurnApplied",
            "SessionEnded",
        ]
    );
    for (i, event) in lines.iter().enumerate() {
        assert_eq!(event["sequence"], i);
    }
    assert_eq!(lines[6]["result"], "FAIL");
}

#[test]
fn replay_malformed_delta_exits_with_collaborator_code() {
    let output = run_cli(&["replay", &fixture("malformed_delta.yaml")]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("malformed turn delta"));
}

#[test]
fn replay_missing_script_is_config_error() {
    let output = run_cli(&["replay", "/nonexistent/delirium_sim_script.yaml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_accepts_good_config() {
    let output = run_cli(&["validate", &fixture("valid_config.yaml")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("valid_config.yaml: ok"));
}

#[test]
fn validate_rejects_bad_config() {
    let output = run_cli(&["validate", &fixture("invalid_config.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("llm.model"), "stderr: {err}");
    assert!(err.contains("llm.narrator.temperature"), "stderr: {err}");
}

#[test]
fn validate_without_files_is_usage_error() {
    let output = run_cli(&["validate"]);
    assert!(!output.status.success());
}

#[test]
fn version_json() {
    let output = run_cli(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["name"], "delirium-sim");
    assert_eq!(parsed["max_turns"], 10);
}
