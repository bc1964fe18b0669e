#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const REMOTE_GROUP: &str = r#"{
  "id": "sig-1",
  "compute": {
    "launchSpecification": {
      "imageId": "ami-123",
      "keyPair": "deploy",
      "securityGroupIds": ["sg-1"]
    }
  }
}"#;

const CONFIG: &str = "image_id: ami-123\nkey_name: deploy\nsecurity_groups:\n  - sg-1\n";

fn spotform() -> Command {
    let mut cmd = Command::cargo_bin("spotform").unwrap();
    cmd.env_remove("SPOTFORM_CONFIG_PATH").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_cli_help() {
    spotform()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("read"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn test_plan_help_lists_resources() {
    spotform()
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("launch-configuration"))
        .stdout(predicate::str::contains("route53"))
        .stdout(predicate::str::contains("gke-launch-spec"));
}

#[test]
fn test_unknown_resource_fails() {
    spotform()
        .args(["schema", "--resource", "ecs-cluster"])
        .assert()
        .failure();
}

#[test]
fn test_schema_prints_json() {
    let schema = stdout_json(spotform().args(["schema", "--resource", "launch-configuration"]));

    assert_eq!(schema["security_groups"]["required"], true);
    assert_eq!(schema["metadata_options"]["max_items"], 1);
    assert_eq!(schema["image_id"]["type"], "string");
}

#[test]
fn test_schema_gke_includes_strategy_extension() {
    let schema = stdout_json(spotform().args(["schema", "--resource", "gke-launch-spec"]));
    assert!(schema.get("ocean_id").is_some());
    assert!(schema.get("strategy").is_some());
}

#[test]
fn test_plan_prints_create_payload() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = write(temp_dir.path(), "spotform.yaml", CONFIG);

    let payload = stdout_json(
        spotform()
            .args(["plan", "--resource", "launch-configuration", "--config"])
            .arg(&config),
    );
    let spec = &payload["compute"]["launchSpecification"];
    assert_eq!(spec["imageId"], "ami-123");
    assert_eq!(spec["keyPair"], "deploy");
    assert_eq!(spec["securityGroupIds"], serde_json::json!(["sg-1"]));
}

#[test]
fn test_plan_discovers_config_in_current_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(
        temp_dir.path(),
        "spotform.json",
        r#"{"ocean_id": "o-1", "labels": {"team": "infra"}}"#,
    );

    let payload = stdout_json(
        spotform()
            .current_dir(temp_dir.path())
            .args(["plan", "--resource", "gke-launch-spec"]),
    );
    assert_eq!(payload["oceanId"], "o-1");
    assert_eq!(
        payload["labels"],
        serde_json::json!([{"key": "team", "value": "infra"}])
    );
}

#[test]
fn test_plan_rejects_invalid_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = write(temp_dir.path(), "spotform.yaml", "image_id: ami-123\n");

    spotform()
        .args(["plan", "--resource", "launch-configuration", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("security_groups"));
}

#[test]
fn test_read_flattens_remote_object() {
    let temp_dir = tempfile::tempdir().unwrap();
    let remote = write(temp_dir.path(), "remote.json", REMOTE_GROUP);

    let state = stdout_json(
        spotform()
            .args(["read", "--resource", "launch-configuration", "--remote"])
            .arg(&remote),
    );
    assert_eq!(state["image_id"], "ami-123");
    assert_eq!(state["key_name"], "deploy");
    assert_eq!(state["security_groups"], serde_json::json!(["sg-1"]));
}

#[test]
fn test_diff_against_read_state() {
    let temp_dir = tempfile::tempdir().unwrap();
    let remote = write(temp_dir.path(), "remote.json", REMOTE_GROUP);
    let config = write(temp_dir.path(), "spotform.yaml", CONFIG);

    let output = spotform()
        .args(["read", "--resource", "launch-configuration", "--remote"])
        .arg(&remote)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let state = temp_dir.path().join("state.json");
    fs::write(&state, output).unwrap();

    let plan = stdout_json(
        spotform()
            .args(["diff", "--resource", "launch-configuration", "--config"])
            .arg(&config)
            .arg("--state")
            .arg(&state),
    );
    assert_eq!(plan["has_changes"], false);

    let rotated = write(
        temp_dir.path(),
        "rotated.yaml",
        "image_id: ami-123\nkey_name: rotated\nsecurity_groups:\n  - sg-1\n",
    );
    let plan = stdout_json(
        spotform()
            .args(["diff", "--resource", "launch-configuration", "--config"])
            .arg(&rotated)
            .arg("--state")
            .arg(&state),
    );
    assert_eq!(plan["has_changes"], true);
    assert_eq!(plan["changed_fields"], serde_json::json!(["key_name"]));
    assert_eq!(
        plan["payload"]["compute"]["launchSpecification"]["keyPair"],
        "rotated"
    );
}

#[test]
fn test_diff_without_state_reports_everything() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = write(
        temp_dir.path(),
        "spotform.json",
        r#"{"integration_route53": [{"domains": [{"hosted_zone_id": "Z1", "record_sets": [{"name": "web.example.com"}]}]}]}"#,
    );

    let plan = stdout_json(
        spotform()
            .args(["diff", "--resource", "route53", "--config"])
            .arg(&config),
    );
    assert_eq!(plan["changed_fields"], serde_json::json!(["integration_route53"]));
    assert_eq!(
        plan["payload"]["integration"]["route53"]["domains"][0]["hostedZoneId"],
        "Z1"
    );
}
