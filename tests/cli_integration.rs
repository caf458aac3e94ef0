use std::process::{Command, Output};

#[derive(Debug)]
struct Kpis {
    cycles: u64,
    tap_raises: u64,
    out_of_band: u64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_dynamics() {
    let baseline = run_and_parse_kpis(&["--scenario", "scenarios/baseline.toml"]);
    let low_voltage = run_and_parse_kpis(&["--scenario", "scenarios/low_voltage.toml"]);
    let field_tokens = run_and_parse_kpis(&["--scenario", "scenarios/field_tokens.toml"]);

    assert_eq!(baseline.cycles, 48);
    assert_eq!(low_voltage.cycles, 48);
    assert_eq!(field_tokens.cycles, 24);

    assert!(
        low_voltage.tap_raises > baseline.tap_raises,
        "expected low_voltage to raise more: baseline={baseline:?}, low_voltage={low_voltage:?}"
    );
    assert!(
        low_voltage.out_of_band > 0,
        "expected low_voltage to leave the band: {low_voltage:?}"
    );
}

#[test]
fn preset_and_cycle_override() {
    let kpis = run_and_parse_kpis(&["--preset", "unbalanced", "--cycles", "5"]);
    assert_eq!(kpis.cycles, 5);
}

#[test]
fn unknown_preset_fails() {
    let output = run(&["--preset", "nonexistent"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr={stderr}");
}

#[test]
fn help_exits_cleanly() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--state-out"));
}

#[test]
fn state_and_telemetry_files_are_written() {
    let dir = std::env::temp_dir().join(format!("substation-vvc-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let state = dir.join("carry.toml");
    let telemetry = dir.join("cycles.csv");

    let output = run(&[
        "--preset",
        "low_voltage",
        "--cycles",
        "6",
        "--state-out",
        state.to_str().expect("utf-8 path"),
        "--telemetry-out",
        telemetry.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let carry = std::fs::read_to_string(&state).expect("state file should exist");
    assert!(carry.contains("[counters]"));
    let csv = std::fs::read_to_string(&telemetry).expect("telemetry file should exist");
    assert!(csv.starts_with("cycle,day,nins,avg_kv"));
    assert_eq!(csv.lines().count(), 7);

    // Resuming from the saved state must also succeed.
    let resumed = run(&[
        "--preset",
        "low_voltage",
        "--cycles",
        "2",
        "--state-in",
        state.to_str().expect("utf-8 path"),
    ]);
    assert!(resumed.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_substation-vvc"))
        .args(args)
        .output()
        .expect("substation-vvc process should run")
}

fn run_and_parse_kpis(args: &[&str]) -> Kpis {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("--- KPI Report ---"));
    Kpis {
        cycles: parse_metric(&stdout, "Cycles:"),
        tap_raises: parse_metric(&stdout, "Tap controls:"),
        out_of_band: parse_metric(&stdout, "Out-of-band cycles:"),
    }
}

/// Reads the first integer after `label`.
fn parse_metric(stdout: &str, label: &str) -> u64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing KPI line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid KPI format for line `{line}`"));

    raw.split_whitespace()
        .next()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or_else(|| panic!("invalid KPI value in line `{line}`"))
}
