// integration tests for conflict detection and auxiliary commands

use crate::common::{
    cleanup_test_dir, create_test_dir, json_result, run_ok, run_radial, run_radial_with_env,
};

#[test]
fn test_profession_sets_conflict() {
    let test_dir = create_test_dir("conflicts_professions");
    let config = test_dir.join("settings.json");

    run_ok(
        &config,
        &["add", "guardian_wheel", "profession", "--profession", "guardian"],
    );
    let output = run_radial(
        &config,
        &["add", "thief_wheel", "profession", "--profession", "thief"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("can never be active together"));

    let output = run_radial(&config, &["conflicts"]);
    assert_eq!(output.status.code(), Some(6));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("guardian_wheel <-> thief_wheel"));
    assert!(stdout.contains("profession(Guardian) vs profession(Thief)"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_conflicts_for_one_set_json() {
    let test_dir = create_test_dir("conflicts_one_set");
    let config = test_dir.join("settings.json");

    run_ok(&config, &["add", "combat", "in-combat"]);
    run_ok(&config, &["add", "peace", "in-combat", "--not"]);
    run_ok(&config, &["add", "swim", "underwater"]);

    let output = run_radial(&config, &["conflicts", "peace", "--json"]);
    assert_eq!(output.status.code(), Some(6));

    let result = json_result(&String::from_utf8_lossy(&output.stdout));
    let items = result["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["first"], "peace");
    assert_eq!(items[0]["second"], "combat");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_or_sets_do_not_conflict() {
    let test_dir = create_test_dir("conflicts_none");
    let config = test_dir.join("settings.json");

    run_ok(
        &config,
        &["add", "a", "profession", "--profession", "guardian"],
    );
    run_ok(&config, &["add", "a", "wvw"]);
    run_ok(&config, &["add", "b", "profession", "--profession", "thief"]);

    let output = run_radial(&config, &["conflicts"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_path_respects_override() {
    let test_dir = create_test_dir("conflicts_path");
    let env_config = test_dir.join("env.json");
    let flag_config = test_dir.join("flag.json");

    let output = run_radial_with_env(
        &["path"],
        &[("RADIAL_CONFIG", env_config.to_str().unwrap())],
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        env_config.to_str().unwrap()
    );

    let output = run_radial_with_env(
        &["path", "--config", flag_config.to_str().unwrap()],
        &[("RADIAL_CONFIG", env_config.to_str().unwrap())],
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        flag_config.to_str().unwrap()
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_completions_bash() {
    let test_dir = create_test_dir("conflicts_completions");
    let config = test_dir.join("settings.json");

    let stdout = run_ok(&config, &["completions", "bash"]);
    assert!(stdout.contains("radial"));
    assert!(stdout.contains("conflicts"));

    cleanup_test_dir(&test_dir);
}
