// CLI smoke tests for the launchpad binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_no_args_shows_flow_overview() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("LAUNCHPAD - Workspace Onboarding"))
        .stdout(predicate::str::contains("1. basics"))
        .stdout(predicate::str::contains("6. branding"))
        .stdout(predicate::str::contains("launchpad status --user"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("reset"))
        .stdout(predicate::str::contains("catalog"))
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("estimate"));
}

#[test]
fn test_estimate_pro_yearly_reports_savings() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.args(["estimate", "--plan", "pro", "--cycle", "yearly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monthly: 29"))
        .stdout(predicate::str::contains("yearly:  290"))
        .stdout(predicate::str::contains("savings when billed yearly: 58"));
}

#[test]
fn test_estimate_free_plan_is_zero_with_features() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.args(["estimate", "--plan", "free", "--features", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monthly: 0"))
        .stdout(predicate::str::contains("yearly:  0"));
}

#[test]
fn test_estimate_unknown_plan_fails() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.args(["estimate", "--plan", "platinum"]).assert().failure();
}

#[test]
fn test_recommend_omits_already_selected_features() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.args([
        "recommend",
        "--industry",
        "marketing",
        "--team-size",
        "solo",
        "--selected",
        "content_calendar",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("post_scheduler"))
    .stdout(predicate::str::contains("analytics_dashboard"))
    .stdout(predicate::str::contains("content_calendar").not());
}

#[test]
fn test_catalog_plans_section() {
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.args(["catalog", "--section", "plans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("free"))
        .stdout(predicate::str::contains("pro"))
        .stdout(predicate::str::contains("business"));
}

#[test]
fn test_status_for_unknown_user() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("launchpad").unwrap();

    cmd.env("LAUNCHPAD_STORAGE__ROOT_DIR", dir.path().join("wizard-state"))
        .args(["status", "--user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No in-progress wizard for nobody"));
}
