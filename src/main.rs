//! Volt/VAR controller entry point: CLI wiring, plant or frame replay, reports.

use std::path::Path;
use std::process;

use substation_vvc::config::ScenarioConfig;
use substation_vvc::io::export::export_csv;
use substation_vvc::io::frames::load_frames;
use substation_vvc::io::state::{load_state, save_state};
use substation_vvc::sim::kpi::KpiReport;
use substation_vvc::sim::plant::Plant;
use substation_vvc::sim::runner::Runner;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    cycles_override: Option<usize>,
    frames: Option<String>,
    state_in: Option<String>,
    state_out: Option<String>,
    telemetry_out: Option<String>,
}

fn print_help() {
    eprintln!("substation-vvc: substation Volt/VAR control engine");
    eprintln!();
    eprintln!("Usage: substation-vvc [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, low_voltage, unbalanced)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --cycles <n>             Override number of control cycles");
    eprintln!("  --frames <path>          Replay measurement frames (cycle,tag,value CSV)");
    eprintln!("  --state-in <path>        Resume from a saved carry-forward");
    eprintln!("  --state-out <path>       Save the final carry-forward");
    eprintln!("  --telemetry-out <path>   Export cycle records to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to see the per-cycle audit trail.");
}

/// Returns the value following flag `args[*i]`, or exits with an error.
fn flag_value(args: &[String], i: &mut usize, what: &str) -> String {
    let flag = &args[*i];
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires {what}");
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        cycles_override: None,
        frames: None,
        state_in: None,
        state_out: None,
        telemetry_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument")),
            "--preset" => cli.preset = Some(flag_value(&args, &mut i, "a name argument")),
            "--seed" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                if let Ok(s) = v.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--cycles" => {
                let v = flag_value(&args, &mut i, "a count argument");
                if let Ok(n) = v.parse::<usize>() {
                    cli.cycles_override = Some(n);
                } else {
                    eprintln!("error: --cycles value \"{v}\" is not a valid count");
                    process::exit(1);
                }
            }
            "--frames" => cli.frames = Some(flag_value(&args, &mut i, "a path argument")),
            "--state-in" => cli.state_in = Some(flag_value(&args, &mut i, "a path argument")),
            "--state-out" => cli.state_out = Some(flag_value(&args, &mut i, "a path argument")),
            "--telemetry-out" => {
                cli.telemetry_out = Some(flag_value(&args, &mut i, "a path argument"));
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    // A second init (e.g. under a test harness) is harmless.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

fn main() {
    let cli = parse_args();
    init_tracing();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(cycles) = cli.cycles_override {
        scenario.simulation.cycles = cycles;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let sim = &scenario.simulation;
    let substation = scenario.substation.clone();
    let carry = match cli.state_in {
        Some(ref path) => match load_state(Path::new(path)) {
            Ok(carry) => carry,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => substation.fresh_carry(),
    };
    let mut runner = Runner::new(substation, carry, sim.cycles_per_day);

    let result = if let Some(ref path) = cli.frames {
        match load_frames(Path::new(path)) {
            Ok(frames) => {
                info!(frames = frames.len(), path = %path, "replaying measurement frames");
                runner.run_frames(&frames)
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        let mut plant = Plant::new(
            &scenario.plant,
            &scenario.substation,
            sim.cycles_per_day,
            sim.seed,
        );
        info!(
            substation = %scenario.substation.name,
            cycles = sim.cycles,
            seed = sim.seed,
            "running simulated plant"
        );
        runner.run_plant(&mut plant, sim.cycles)
    };

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for r in &records {
        println!("{r}");
    }

    let kpi = KpiReport::from_records(&records);
    println!("\n{kpi}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }

    if let Some(ref path) = cli.state_out {
        if let Err(e) = save_state(runner.carry(), Path::new(path)) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        eprintln!("State written to {path}");
    }
}
