#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

fn lssbus(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lssbus"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LSS_PORT")
        .env_remove("LSS_BAUD")
        .env_remove("LSS_LOW_LATENCY")
        .output()
        .expect("lssbus should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn decode_prints_one_json_object_per_frame() {
    let output = lssbus(&["--format", "json", "decode", "*12QD-1190", "#5CLED3", "*0QMSLSS-HT1"]);
    assert!(output.status.success());

    let packets = json_lines(&output);
    assert_eq!(packets.len(), 3);

    assert_eq!(packets[0]["device_id"], 12);
    assert_eq!(packets[0]["direction"], "reply");
    assert_eq!(packets[0]["command"], "D");
    assert_eq!(packets[0]["value"], -1190);
    assert_eq!(packets[0]["description"], "Position in Degrees");

    assert_eq!(packets[1]["direction"], "request");
    assert_eq!(packets[1]["kind"], "config");
    assert_eq!(packets[1]["command"], "LED");

    assert_eq!(packets[2]["value"], "LSS-HT1");
}

#[test]
fn decode_raw_echoes_wire_form() {
    let output = lssbus(&["--format", "raw", "decode", "#1qd"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "#1QD");
}

#[test]
fn decode_garbled_frame_exits_data_invalid() {
    let output = lssbus(&["--format", "json", "decode", "*1QD12X"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("garbled"));
}

#[test]
fn decode_without_marker_exits_data_invalid() {
    let output = lssbus(&["decode", "5QD"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn commands_json_lists_tables() {
    let output = lssbus(&["--format", "json", "commands"]);
    assert!(output.status.success());

    let docs = json_lines(&output);
    assert_eq!(docs.len(), 1);
    let commands = docs[0]["commands"].as_array().expect("commands array");
    let modifiers = docs[0]["modifiers"].as_array().expect("modifiers array");
    assert!(commands
        .iter()
        .any(|c| c["token"] == "LED" && c["description"] == "LED Color"));
    assert!(modifiers.iter().any(|m| m["token"] == "SD"));
}

#[test]
fn query_on_missing_port_exits_transport_error() {
    let output = lssbus(&[
        "query",
        "--port",
        "/dev/lssbus-does-not-exist",
        "--low-latency",
        "off",
        "1",
        "D",
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/dev/lssbus-does-not-exist"));
}

#[test]
fn bad_timeout_exits_usage() {
    let output = lssbus(&["query", "--timeout", "soon", "1", "D"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = lssbus(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("lssbus {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_reports_build_provenance() {
    let output = lssbus(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: lssbus"));
    assert!(stdout.lines().any(|l| l.starts_with("target: ") && l != "target: unknown"));
    assert!(stdout.lines().any(|l| l.starts_with("profile: ")));
}

#[test]
fn help_describes_the_servo_bus() {
    let output = lssbus(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lynxmotion Smart Servos"));
    assert!(stdout.contains("lssbus decode '*5QD1800'"));
}

#[test]
fn errors_are_prefixed_with_program_name() {
    let output = lssbus(&["decode", "5QD"]);
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("lssbus: "));
}
