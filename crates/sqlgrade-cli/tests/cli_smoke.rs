use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn sqlgrade() -> Command {
    Command::cargo_bin("sqlgrade").unwrap()
}

#[test]
fn test_init_then_grade_writes_report_and_logs() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("grade.yaml");

    sqlgrade()
        .arg("init")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(contains("created"));

    fs::write(
        dir.path().join("queries/2023A7PS0043H.sql"),
        "--1--\nSELECT * FROM Student ORDER BY id DESC;\n\n--2--\nSELECT COUNT(*) FROM Students;",
    )
    .unwrap();
    fs::write(
        dir.path().join("queries/2023A7PS0001H.sql"),
        "--1--\nSELECT * FROM Student;\n--2--\nSELECT COUNT(*) FROM Student;",
    )
    .unwrap();

    sqlgrade()
        .arg("grade")
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .arg(dir.path().join("run.json"))
        .assert()
        .success()
        .stderr(contains("Summary: 2 students"));

    let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "StudentID,Q1,Q2,Total");
    assert_eq!(lines[1], "2023A7PS0001H,PASS,PASS,2/2");
    assert_eq!(lines[2], "2023A7PS0043H,PASS,FAIL,1/2");

    let log = fs::read_to_string(dir.path().join("logs/2023A7PS0043H.log")).unwrap();
    assert!(log.contains("SQL ERROR:"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("run.json")).unwrap()).unwrap();
    assert_eq!(summary["summary"]["error"], 1);
}

#[test]
fn test_grade_missing_config_exits_2() {
    let dir = TempDir::new().unwrap();
    sqlgrade()
        .arg("grade")
        .arg("--config")
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .code(2)
        .stderr(contains("failed to read config"));
}

#[test]
fn test_grade_missing_model_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("grade.yaml");
    sqlgrade().arg("init").arg("--config").arg(&config).assert().success();
    fs::remove_file(dir.path().join("model_solution.sql")).unwrap();

    sqlgrade()
        .arg("grade")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(contains("failed to read model solution"));
}

#[test]
fn test_check_reports_slots_and_exit_code() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("2023A7PS0043H.sql");
    fs::write(&good, "--1--\nSELECT 1;\n--2--\nSELECT 2").unwrap();
    sqlgrade()
        .arg("check")
        .arg(&good)
        .assert()
        .success()
        .stderr(contains("Query 1: [PASS] Correctly formatted."))
        .stderr(contains("Query 2: [WARN]"));

    let bad = dir.path().join("2023A7PS0044H.sql");
    fs::write(&bad, "--1--\nSELECT 1;").unwrap();
    sqlgrade()
        .arg("check")
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(contains("Marker --2-- is missing."));

    let misnamed = dir.path().join("answers.sql");
    fs::write(&misnamed, "--1--\nSELECT 1;\n--2--\nSELECT 2;").unwrap();
    sqlgrade()
        .arg("check")
        .arg(&misnamed)
        .assert()
        .code(1)
        .stderr(contains("invalid filename"));
}

#[test]
fn test_submit_binds_address_to_id() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("grade.yaml");
    sqlgrade().arg("init").arg("--config").arg(&config).assert().success();

    let upload = dir.path().join("2023A7PS0043H.sql");
    fs::write(&upload, "--1--\nSELECT 1;\n--2--\nSELECT 2;").unwrap();
    sqlgrade()
        .args(["submit", "--client-ip", "10.1.1.1", "--config"])
        .arg(&config)
        .arg(&upload)
        .assert()
        .success()
        .stderr(contains("Submission successful"));
    assert!(dir.path().join("queries/2023A7PS0043H.sql").exists());

    let other = dir.path().join("2023A7PS0099H.sql");
    fs::write(&other, "--1--\nSELECT 1;\n--2--\nSELECT 2;").unwrap();
    sqlgrade()
        .args(["submit", "--client-ip", "10.1.1.1", "--config"])
        .arg(&config)
        .arg(&other)
        .assert()
        .code(1)
        .stderr(contains("already submitted for student id 2023A7PS0043H"));
}
