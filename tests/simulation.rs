use std::fs;
use std::path::PathBuf;

use firstfit::allocator::{AllocationError, Event, ReleaseError};
use firstfit::config::Config;
use firstfit::request::Script;
use firstfit::simulation::{self, Simulation};

fn config_for(name: &str, script: &str) -> Config {
    let path = std::env::temp_dir().join(format!("firstfit-{}-{}.txt", name, std::process::id()));
    fs::write(&path, script).unwrap();
    Config {
        input: path,
        log_level: log::LevelFilter::Off,
        quiet: false,
    }
}

#[test]
fn scenario_from_script() {
    let script: Script = "100\nREQUEST A 30\nREQUEST B 40\nRELEASE A\nREQUEST C 50\nRELEASE B\n"
        .parse()
        .unwrap();
    let simulation = Simulation::run(&script, |_| Ok(())).unwrap();

    assert_eq!(
        simulation.events(),
        &[
            Event::AllocationSucceeded { owner: "A".into(), size: 30, start: 0 },
            Event::AllocationSucceeded { owner: "B".into(), size: 40, start: 30 },
            Event::ReleaseSucceeded { owner: "A".into() },
            Event::AllocationFailed {
                owner: "C".into(),
                size: 50,
                reason: AllocationError::InsufficientMemory,
            },
            Event::ReleaseSucceeded { owner: "B".into() },
        ],
    );

    let allocator = simulation.allocator();
    assert_eq!(allocator.blocks().len(), 1);
    assert_eq!(allocator.blocks()[0].size, 100);
    assert!(allocator.blocks()[0].is_free());
    assert_eq!(allocator.successful_allocations(), 2);
    assert_eq!(allocator.failed_allocations(), 1);
}

#[test]
fn demo_script_runs_end_to_end() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/requests.txt");
    let config = Config {
        input: path,
        log_level: log::LevelFilter::Off,
        quiet: false,
    };

    let mut out = Vec::new();
    let simulation = simulation::run_file(&config, &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    // Releasing P2 leaves a 300 KB hole at 200. P4 takes its
    // front, P5 does not fit the rest and goes after P3. P6
    // finds no block of 400. Releasing P4 merges 0..499 into
    // one hole that P7 then fills exactly.
    assert!(report.starts_with("========================================\nMemory Allocation Simulator (First-Fit)\n"));
    assert!(report.contains("Total Memory: 1024 KB\n"));
    assert!(report.contains("REQUEST P4 100 KB → SUCCESS\n"));
    assert!(report.contains("RELEASE P9 → FAILED (Process not found)\n"));
    assert!(report.contains("REQUEST P5 250 KB → SUCCESS\n"));
    assert!(report.contains("REQUEST P6 400 KB → FAILED (Insufficient Memory)\n"));
    assert!(report.contains("REQUEST P7 500 KB → SUCCESS\n"));
    assert!(report.contains("Block 1: [0-499]  P7 (500 KB) - ALLOCATED\n"));
    assert!(report.contains("Block 3: [650-899]  P5 (250 KB) - ALLOCATED\n"));
    assert!(report.contains("Block 4: [900-1023]  FREE (124 KB)\n"));

    let stats = simulation.allocator().statistics();
    assert_eq!(stats.allocated + stats.free, 1024);
    assert!(simulation.allocator().ledger().check_invariants().is_ok());
    assert!(simulation.events().contains(&Event::ReleaseFailed {
        owner: "P9".into(),
        reason: ReleaseError::ProcessNotFound,
    }));
}

#[test]
fn quiet_mode_omits_events() {
    let mut config = config_for("quiet", "50\nREQUEST A 50\nREQUEST B 1\n");
    config.quiet = true;

    let mut out = Vec::new();
    simulation::run_file(&config, &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    fs::remove_file(&config.input).unwrap();

    assert!(!report.contains("→"));
    assert!(report.contains("Block 1: [0-49]  A (50 KB) - ALLOCATED\n"));
    assert!(report.contains("External Fragmentation: 0.00%\n"));
    assert!(report.contains("Failed Allocations:     1\n"));
}

#[test]
fn malformed_script_is_rejected() {
    let config = config_for("malformed", "100\nREQUEST A lots\n");

    let mut out = Vec::new();
    let err = simulation::run_file(&config, &mut out).unwrap_err();
    fs::remove_file(&config.input).unwrap();

    assert!(format!("{:#}", err).contains("Line 2: invalid size 'lots'."));
    assert!(out.is_empty());
}

#[test]
fn missing_file_is_reported() {
    let config = Config {
        input: PathBuf::from("/nonexistent/firstfit/requests.txt"),
        log_level: log::LevelFilter::Off,
        quiet: false,
    };

    let mut out = Vec::new();
    let err = simulation::run_file(&config, &mut out).unwrap_err();
    assert!(err.to_string().starts_with("Error reading file:"));
}

#[test]
fn duplicate_request_is_reported() {
    let config = config_for("duplicate", "100\nREQUEST A 10\nREQUEST A 10\nRELEASE A\nREQUEST A 20\n");

    let mut out = Vec::new();
    let simulation = simulation::run_file(&config, &mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    fs::remove_file(&config.input).unwrap();

    // The second request is refused, A keeps its first block
    // until it is released and can then allocate again.
    assert!(report.contains("REQUEST A 10 KB → SUCCESS\nREQUEST A 10 KB → FAILED (Process already allocated)\n"));
    assert!(report.contains("REQUEST A 20 KB → SUCCESS\n"));
    assert!(report.contains("Block 1: [0-19]  A (20 KB) - ALLOCATED\n"));
    assert!(report.contains("Successful Allocations: 2\n"));
    assert!(report.contains("Failed Allocations:     1\n"));
    assert_eq!(simulation.allocator().blocks().len(), 2);
}
