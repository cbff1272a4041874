// integration tests for evaluating and checking rule sets

use std::fs;

use crate::common::{cleanup_test_dir, create_test_dir, json_result, run_ok, run_radial};

#[test]
fn test_eval_in_combat_round_trip() {
    let test_dir = create_test_dir("eval_in_combat");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "combat", "in-combat"]);

    let output = run_radial(&config, &["eval", "combat", "--combat"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "pass");

    let output = run_radial(&config, &["eval", "combat"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "fail");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_empty_set_passes() {
    let test_dir = create_test_dir("eval_empty");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "empty", "underwater"]);
    run_ok(&config, &["clear", "empty"]);

    let result = json_result(&run_ok(&config, &["eval", "empty", "--json"]));
    assert_eq!(result["passes"], true);
    assert_eq!(result["expression"], "always");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_grouping_matters() {
    let test_dir = create_test_dir("eval_grouping");
    let config = test_dir.join("settings.json");

    // (in_combat OR wvw) AND underwater
    run_ok(&config, &["add", "left", "in-combat"]);
    run_ok(&config, &["add", "left", "wvw"]);
    run_ok(&config, &["add", "left", "underwater", "--op", "and"]);
    run_ok(&config, &["group", "left", "0", "1"]);

    // in_combat OR (wvw AND underwater)
    run_ok(&config, &["add", "right", "in-combat"]);
    run_ok(&config, &["add", "right", "wvw"]);
    run_ok(&config, &["add", "right", "underwater", "--op", "and"]);
    run_ok(&config, &["group", "right", "1", "2"]);

    let output = run_radial(&config, &["eval", "left", "--combat"]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_radial(&config, &["eval", "right", "--combat"]);
    assert_eq!(output.status.code(), Some(0));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_state_file_and_overrides() {
    let test_dir = create_test_dir("eval_state_file");
    let config = test_dir.join("settings.json");
    let state = test_dir.join("state.json");

    run_ok(
        &config,
        &["add", "mesmer_wvw", "profession", "--profession", "mesmer"],
    );
    run_ok(&config, &["add", "mesmer_wvw", "wvw", "--op", "and"]);

    fs::write(
        &state,
        r#"{ "profession": "mesmer", "map_type": 0, "character_name": "Canach" }"#,
    )
    .unwrap();
    let state_path = state.to_str().unwrap();

    let output = run_radial(&config, &["eval", "mesmer_wvw", "--state", state_path]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_radial(
        &config,
        &["eval", "mesmer_wvw", "--state", state_path, "--map-type", "18"],
    );
    assert_eq!(output.status.code(), Some(0));

    let output = run_radial(
        &config,
        &["eval", "mesmer_wvw", "--wvw", "--profession", "thief"],
    );
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_character_name() {
    let test_dir = create_test_dir("eval_character");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "alt", "character", "--name", "Taimi", "--not"]);

    let output = run_radial(&config, &["eval", "alt", "--character", "Taimi"]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_radial(&config, &["eval", "alt", "--character", "Gorrik"]);
    assert_eq!(output.status.code(), Some(0));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_invalid_state_file() {
    let test_dir = create_test_dir("eval_bad_state");
    let config = test_dir.join("settings.json");
    let state = test_dir.join("state.json");

    run_ok(&config, &["add", "w", "wvw"]);
    fs::write(&state, "not json").unwrap();

    let output = run_radial(&config, &["eval", "w", "--state", state.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid game state"));

    cleanup_test_dir(&test_dir);
}

/// settings with a group that is opened but never closed
fn write_malformed(path: &std::path::Path) {
    let settings = r#"{
        "broken": {
            "entries_version": 1,
            "entry_count": 2,
            "entry_0_id": 0,
            "entry_0_kind": "in_combat",
            "entry_0_op": 2,
            "entry_1_id": 1,
            "entry_1_kind": "underwater",
            "entry_1_op": 0
        },
        "fine": {
            "entries_version": 1,
            "entry_count": 1,
            "entry_0_id": 0,
            "entry_0_kind": "underwater",
            "entry_0_op": 0
        }
    }"#;
    fs::write(path, settings).unwrap();
}

#[test]
fn test_malformed_set_is_reported() {
    let test_dir = create_test_dir("eval_malformed");
    let config = test_dir.join("settings.json");
    write_malformed(&config);

    let output = run_radial(&config, &["eval", "broken", "--combat"]);
    assert_eq!(output.status.code(), Some(7));

    let output = run_radial(&config, &["check", "--json"]);
    assert_eq!(output.status.code(), Some(7));
    let result = json_result(&String::from_utf8_lossy(&output.stdout));
    let items = result["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["category"], "broken");
    assert_eq!(items[0]["valid"], false);
    assert_eq!(items[1]["valid"], true);

    let output = run_radial(&config, &["check", "fine"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "fine: ok");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_unreadable_settings_file() {
    let test_dir = create_test_dir("eval_bad_settings");
    let config = test_dir.join("settings.json");
    fs::write(&config, "{ not json").unwrap();

    let output = run_radial(&config, &["list"]);
    assert_eq!(output.status.code(), Some(5));

    cleanup_test_dir(&test_dir);
}
