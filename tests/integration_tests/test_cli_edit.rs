// integration tests for editing rule sets through the CLI

use std::fs;

use crate::common::{cleanup_test_dir, create_test_dir, json_result, run_ok, run_radial};

#[test]
fn test_add_creates_set_and_prints_ids() {
    let test_dir = create_test_dir("edit_add_creates");
    let config = test_dir.join("settings.json");

    assert_eq!(run_ok(&config, &["add", "mounts", "in-combat"]).trim(), "0");
    assert_eq!(
        run_ok(&config, &["add", "mounts", "wvw", "--op", "and", "--not"]).trim(),
        "1"
    );

    let stdout = run_ok(&config, &["show", "mounts", "--json"]);
    let result = json_result(&stdout);

    assert_eq!(result["category"], "mounts");
    assert_eq!(result["expression"], "in_combat AND not wvw");
    assert_eq!(result["valid"], true);
    assert_eq!(result["entries"].as_array().unwrap().len(), 2);
    assert_eq!(result["entries"][1]["kind"], "wvw");
    assert_eq!(result["entries"][1]["negate"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_settings_file_layout() {
    let test_dir = create_test_dir("edit_file_layout");
    let config = test_dir.join("nested").join("settings.json");

    run_ok(
        &config,
        &["add", "thief_wheel", "profession", "--profession", "thief"],
    );
    run_ok(
        &config,
        &["add", "thief_wheel", "character", "--name", "Zojja", "--op", "and"],
    );

    let content = fs::read_to_string(&config).expect("settings file not written");
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    let section = &json["thief_wheel"];

    assert_eq!(section["entries_version"], 1);
    assert_eq!(section["entry_count"], 2);
    assert_eq!(section["entry_0_kind"], "profession");
    assert_eq!(section["entry_1_op"], 1);
    assert_eq!(section["condition_0_profession_id"], 5);
    assert_eq!(section["condition_1_character_charname"], "Zojja");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_group_and_ungroup() {
    let test_dir = create_test_dir("edit_group");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "w", "in-combat"]);
    run_ok(&config, &["add", "w", "wvw", "--op", "and"]);
    run_ok(&config, &["add", "w", "underwater"]);
    run_ok(&config, &["group", "w", "1", "2"]);

    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(result["expression"], "in_combat AND (wvw OR underwater)");

    run_ok(&config, &["ungroup", "w", "2"]);
    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(result["expression"], "in_combat AND wvw OR underwater");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_remove_keeps_groups_balanced() {
    let test_dir = create_test_dir("edit_remove_balanced");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "w", "in-combat"]);
    run_ok(&config, &["add", "w", "wvw", "--op", "and"]);
    run_ok(&config, &["add", "w", "underwater"]);
    run_ok(&config, &["group", "w", "1", "2"]);
    run_ok(&config, &["remove", "w", "1"]);

    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(result["valid"], true);
    assert_eq!(result["expression"], "in_combat AND (underwater)");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_negate_op_profession_rename() {
    let test_dir = create_test_dir("edit_modifiers");
    let config = test_dir.join("settings.json");

    run_ok(
        &config,
        &["add", "w", "profession", "--profession", "guardian"],
    );
    run_ok(&config, &["add", "w", "character", "--name", "Braham"]);

    run_ok(&config, &["negate", "w", "0"]);
    run_ok(&config, &["op", "w", "1", "and"]);
    run_ok(&config, &["profession", "w", "0", "necro"]);
    run_ok(&config, &["rename", "w", "1", "Rytlock"]);

    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(
        result["expression"],
        "not profession(Necromancer) AND character(\"Rytlock\")"
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_clear_leaves_empty_set() {
    let test_dir = create_test_dir("edit_clear");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "w", "underwater"]);
    run_ok(&config, &["clear", "w"]);

    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(result["expression"], "always");
    assert!(result["entries"].as_array().unwrap().is_empty());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_unknown_profession_suggests() {
    let test_dir = create_test_dir("edit_bad_profession");
    let config = test_dir.join("settings.json");

    let output = run_radial(
        &config,
        &["add", "w", "profession", "--profession", "gaurdian"],
    );
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr.contains("unknown profession 'gaurdian'"));
    assert!(stderr.contains("guardian"));
    assert!(!config.exists());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_missing_set_and_condition() {
    let test_dir = create_test_dir("edit_not_found");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "mounts", "in-combat"]);

    let output = run_radial(&config, &["show", "mount"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("mounts"));

    let output = run_radial(&config, &["remove", "mounts", "9", "--json"]);
    assert_eq!(output.status.code(), Some(3));
    let error: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error is not JSON");
    assert_eq!(error["error"]["code"], -32003);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_invalid_group_is_rejected() {
    let test_dir = create_test_dir("edit_bad_group");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "w", "in-combat"]);
    run_ok(&config, &["add", "w", "wvw"]);

    let output = run_radial(&config, &["group", "w", "1", "0"]);
    assert_eq!(output.status.code(), Some(4));

    let output = run_radial(&config, &["ungroup", "w", "0"]);
    assert_eq!(output.status.code(), Some(4));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_list_sets() {
    let test_dir = create_test_dir("edit_list");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "b_set", "in-combat"]);
    run_ok(&config, &["add", "a_set", "underwater"]);

    let result = json_result(&run_ok(&config, &["list", "--json"]));
    let items = result["items"].as_array().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["category"], "a_set");
    assert_eq!(items[1]["category"], "b_set");
    assert_eq!(items[1]["count"], 1);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_add_to_hand_edited_settings() {
    let test_dir = create_test_dir("edit_hand_edited");
    let config = test_dir.join("settings.json");

    let settings = r#"{
        "w": {
            "entries_version": 1,
            "entry_count": 9223372036854775807,
            "entry_0_id": 4294967294,
            "entry_0_kind": "in_combat",
            "entry_0_op": 0,
            "entry_1_id": 4294967295,
            "entry_1_kind": "underwater",
            "entry_1_op": 0
        }
    }"#;
    fs::write(&config, settings).unwrap();

    assert_eq!(run_ok(&config, &["add", "w", "wvw"]).trim(), "0");

    let result = json_result(&run_ok(&config, &["show", "w", "--json"]));
    assert_eq!(result["expression"], "in_combat OR wvw");
    assert_eq!(result["entries"][0]["id"], 4294967294u64);
    assert_eq!(result["entries"][1]["id"], 0);

    cleanup_test_dir(&test_dir);
}
