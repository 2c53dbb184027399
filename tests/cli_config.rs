mod common;

use common::TestContext;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn path_prints_user_config_file() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(ctx.user_config_file().display().to_string()));
}

#[test]
fn path_falls_back_to_home() {
    let ctx = TestContext::new();
    let expected = ctx.home().join(".config/dask/jobqueue-cern.yaml");

    ctx.cli()
        .env_remove("DASK_CONFIG")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn ensure_writes_once_and_keeps_edits() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "ensure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(ctx.read(&ctx.user_config_file()).contains("batch-name: dask-worker"));

    ctx.write_config("jobqueue-cern.yaml", "jobqueue:\n  cern:\n    batch-name: edited\n");
    ctx.cli()
        .args(["config", "ensure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keeping existing"));
    assert_eq!(
        ctx.read(&ctx.user_config_file()),
        "jobqueue:\n  cern:\n    batch-name: edited\n"
    );
}

#[test]
fn show_json_merges_defaults_under_user_values() {
    let ctx = TestContext::new();
    ctx.write_config("jobqueue-cern.yaml", "jobqueue:\n  cern:\n    cores: 8\n");

    let output = ctx.cli().args(["config", "show", "--json"]).output().expect("Failed to run");
    assert!(output.status.success());
    let section: Value = serde_json::from_slice(&output.stdout).expect("JSON output");

    assert_eq!(section["cores"], Value::from(8));
    assert_eq!(section["container-runtime"], Value::from("singularity"));
    assert_eq!(section["batch-name"], Value::from("dask-worker"));
}

#[test]
fn show_yaml_is_the_default() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("container-runtime: singularity"));
}

#[test]
fn malformed_config_is_reported() {
    let ctx = TestContext::new();
    ctx.write_config("broken.yaml", "jobqueue: [unclosed");

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yaml"));
}
