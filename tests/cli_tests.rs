#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("cli").expect("cli binary")
}

#[test]
fn days_check_reports_weekend() {
    cli()
        .args(["days", "check", "2026-01-10"])
        .assert()
        .success()
        .stdout(str_contains("2026-01-10 (Saturday): day off"));
}

#[test]
fn days_between_counts_exclusive_and_inclusive() {
    cli()
        .args(["days", "between", "2026-01-12", "2026-01-16"])
        .assert()
        .success()
        .stdout("3\n");
    cli()
        .args(["days", "between", "2026-01-12", "2026-01-16", "--inclusive"])
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn days_before_rejects_negative_offset() {
    cli()
        .args(["days", "before", "2026-01-12", "-1"])
        .assert()
        .failure()
        .stderr(str_contains("Error:"));
}

#[test]
fn days_with_huge_offset_report_error_without_panicking() {
    for query in ["before", "after"] {
        cli()
            .args(["days", query, "2026-01-14", "9223372036854775807"])
            .assert()
            .code(1)
            .stderr(str_contains("Error:"))
            .stderr(str_contains("supported date range"));
    }
}

#[test]
fn config_edits_drive_day_queries() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("review.json");
    let config_arg = config.to_string_lossy().to_string();

    cli()
        .args(["config", "--config", &config_arg, "add-holiday", "2026-01-13"])
        .assert()
        .success()
        .stdout(str_contains("Added holiday 2026-01-13"));
    cli()
        .args(["config", "--config", &config_arg, "add-holiday", "2026-01-13"])
        .assert()
        .failure()
        .stderr(str_contains("already listed"));
    cli()
        .args(["config", "--config", &config_arg, "set-coordinator", "101", "Smirnova"])
        .assert()
        .success()
        .stdout(str_contains("Added coordinator 101: Smirnova"));

    cli()
        .args(["days", "--config", &config_arg, "after", "2026-01-12", "1"])
        .assert()
        .success()
        .stdout("2026-01-14\n");

    let saved = fs::read_to_string(&config).expect("config written");
    assert!(saved.contains("2026-01-13"));
    assert!(saved.contains("Smirnova"));
}

#[test]
fn run_writes_reports_and_prints_summary() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("review.json");
    fs::write(
        &config,
        r#"{ "diploma_modules": ["diplom-da"], "coordinators": { "101": "Smirnova" } }"#,
    )
    .expect("write config");
    let input = dir.path().join("works.csv");
    fs::write(
        &input,
        "module,task_title,admin_link,expert_link,student_id,submitted_at,reviewer,possible_reviewers,task_type,coord_id\n\
         fcpp-12,Project,a,e,s-1,2026-01-12,,,diploma,101\n\
         sql-2,Joins,a,e,s-2,not a date,Belova,,homework,\n",
    )
    .expect("write input");
    let output = dir.path().join("out");

    let assert = cli()
        .args(["run", "--config"])
        .arg(&config)
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--today", "2026-01-22", "--show"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Run 2026-01-22 (Thursday) mode=coursework"), "{stdout}");
    assert!(stdout.contains("Processed: records=2"), "{stdout}");
    assert!(stdout.contains("Skipped record 2 (sql-2)"), "{stdout}");
    assert!(stdout.contains("@Smirnova"), "{stdout}");
    assert!(output.join("overdue_coursework_2026-01-22.csv").exists());
    assert!(!output.join("diploma_works_2026-01-22.csv").exists());
}
