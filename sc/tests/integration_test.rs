//! Integration tests for the Santa Claus workshop
//!
//! These tests run whole simulations and check protocol properties against
//! the recorded event stream, then drive the `sc` binary end to end.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::time::Duration;

use assert_cmd::Command as CargoCommand;
use predicates::prelude::*;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use santaclaus::config::{Config, PacingConfig, WorkshopConfig};
use santaclaus::events::{EventBus, WorkshopEvent};
use santaclaus::simulation::Simulation;
use santaclaus::workshop::{ElfId, Outcome};

fn config(elves: usize, reindeer: usize, max_work_ms: u64, max_vacation_ms: u64) -> Config {
    Config {
        workshop: WorkshopConfig {
            elves,
            elves_per_group: 3,
            reindeer,
        },
        pacing: PacingConfig {
            max_work_ms,
            max_vacation_ms,
            seed: Some(42),
        },
        ..Default::default()
    }
}

/// Collect every event until the bus and all emitters are gone
fn record(mut rx: broadcast::Receiver<WorkshopEvent>) -> JoinHandle<Vec<WorkshopEvent>> {
    tokio::spawn(async move {
        let mut events = Vec::new();
        loop {
            match rx.recv().await {
                Ok(event) => events.push(event),
                Err(broadcast::error::RecvError::Lagged(n)) => panic!("recorder lagged by {} events", n),
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        events
    })
}

fn count(events: &[WorkshopEvent], pred: impl Fn(&WorkshopEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// =============================================================================
// Simulation Tests
// =============================================================================

#[tokio::test]
async fn test_fleet_with_no_delay_dispatches_once() {
    let bus = EventBus::new(4096);
    let recorder = record(bus.subscribe());

    let mut sim = Simulation::launch(&config(0, 10, 0, 0), &bus).expect("launch");
    let outcome = tokio::time::timeout(Duration::from_secs(10), sim.wait())
        .await
        .expect("sleigh should depart");
    assert_eq!(outcome, Outcome::Delivered);

    let summary = tokio::task::spawn_blocking(move || sim.join())
        .await
        .unwrap()
        .expect("join");
    drop(bus);
    let events = recorder.await.unwrap();

    assert_eq!(summary.reindeer_hitched, 10);
    assert_eq!(summary.santa.expect("santa report").sleigh_dispatches, 1);

    let prepared: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            WorkshopEvent::SleighPrepared { released } => Some(*released),
            _ => None,
        })
        .collect();
    assert_eq!(prepared, vec![10]);
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::ReindeerHitched { .. })), 10);
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::SleighDeparted)), 1);
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::WorkshopClosed)), 1);
}

#[tokio::test]
async fn test_three_elves_without_reindeer_form_one_group() {
    let bus = EventBus::new(4096);
    let mut rx = bus.subscribe();

    let sim = Simulation::launch(&config(3, 0, 0, 0), &bus).expect("launch");

    let first_group = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match rx.recv().await {
                Ok(WorkshopEvent::ElvesDispatched { elves }) => break elves,
                Ok(_) => continue,
                Err(e) => panic!("event stream ended early: {}", e),
            }
        }
    })
    .await
    .expect("Santa should help the group");

    let ids: HashSet<ElfId> = first_group.iter().copied().collect();
    assert_eq!(first_group.len(), 3);
    assert_eq!(ids, HashSet::from([ElfId(0), ElfId(1), ElfId(2)]));

    let summary = tokio::task::spawn_blocking(move || sim.join())
        .await
        .unwrap()
        .expect("join");
    assert_eq!(summary.elves_joined, 3);
    assert!(summary.santa.is_none(), "Santa never delivers without reindeer");
}

#[tokio::test]
async fn test_full_workshop_keeps_protocol_invariants() {
    let bus = EventBus::new(65536);
    let recorder = record(bus.subscribe());

    let mut sim = Simulation::launch(&config(9, 10, 2, 40), &bus).expect("launch");
    let outcome = tokio::time::timeout(Duration::from_secs(30), sim.wait())
        .await
        .expect("sleigh should depart");
    assert_eq!(outcome, Outcome::Delivered);

    let summary = tokio::task::spawn_blocking(move || sim.join())
        .await
        .unwrap()
        .expect("join");
    drop(bus);
    let events = recorder.await.unwrap();
    let report = summary.santa.expect("santa report");

    let mut in_line: HashMap<ElfId, bool> = HashMap::new();
    let mut groups = 0;
    let mut prepared_at = None;
    let mut hitched = 0;

    for (i, event) in events.iter().enumerate() {
        match event {
            WorkshopEvent::ElfInLine { elf, waiting } => {
                assert!(*waiting <= 3, "admission let {} elves wait", waiting);
                let was = in_line.insert(*elf, true);
                assert_ne!(was, Some(true), "elf {} queued twice", elf);
            }
            WorkshopEvent::SantaHelpingElf { elf } => {
                let was = in_line.insert(*elf, false);
                assert_eq!(was, Some(true), "elf {} dispatched without being in line", elf);
            }
            WorkshopEvent::ElvesDispatched { elves } => {
                let distinct: HashSet<_> = elves.iter().collect();
                assert_eq!(elves.len(), 3);
                assert_eq!(distinct.len(), 3);
                groups += 1;
            }
            WorkshopEvent::SleighPrepared { released } => {
                assert_eq!(*released, 10);
                assert!(prepared_at.is_none(), "sleigh prepared twice");
                let returned = count(&events[..i], |e| matches!(e, WorkshopEvent::ReindeerReturned { .. }));
                assert_eq!(returned, 10, "sleigh prepared before the fleet was back");
                prepared_at = Some(i);
            }
            WorkshopEvent::ReindeerHitched { .. } => {
                assert!(prepared_at.is_some(), "reindeer hitched before the sleigh was ready");
                hitched += 1;
            }
            _ => {}
        }
    }

    assert_eq!(groups, report.elf_groups_helped);
    assert_eq!(report.sleigh_dispatches, 1);
    assert_eq!(hitched, 10);
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::SleighDeparted)), 1);
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::WorkshopClosed)), 1);
}

#[tokio::test]
async fn test_cleanup_runs_once_across_exit_paths() {
    let bus = EventBus::new(4096);
    let recorder = record(bus.subscribe());

    let mut sim = Simulation::launch(&config(3, 1, 0, 0), &bus).expect("launch");
    let outcome = tokio::time::timeout(Duration::from_secs(10), sim.wait())
        .await
        .expect("sleigh should depart");
    assert_eq!(outcome, Outcome::Delivered);

    // interrupt handler, terminal path and drop all race for cleanup
    let workshop = sim.workshop().clone();
    let racers: Vec<_> = (0..4)
        .map(|_| {
            let workshop = workshop.clone();
            std::thread::spawn(move || workshop.close())
        })
        .collect();
    let performed = racers.into_iter().map(|h| h.join().unwrap()).filter(|&did| did).count();
    assert_eq!(performed, 1);
    assert!(!sim.shutdown());

    tokio::task::spawn_blocking(move || sim.join())
        .await
        .unwrap()
        .expect("join");
    drop(workshop);
    drop(bus);
    let events = recorder.await.unwrap();
    assert_eq!(count(&events, |e| matches!(e, WorkshopEvent::WorkshopClosed)), 1);
}

// =============================================================================
// Binary Tests
// =============================================================================

/// Point every per-user directory at a scratch location
fn sandboxed(cmd: &mut Command, home: &TempDir) {
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
}

#[test]
fn test_config_command_prints_overrides() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sc"));
    sandboxed(&mut cmd, &home);
    cmd.args(["config", "--elves", "6", "--reindeer", "4"]);

    CargoCommand::from_std(cmd)
        .assert()
        .success()
        .stdout(predicate::str::contains("elves: 6"))
        .stdout(predicate::str::contains("reindeer: 4"))
        .stdout(predicate::str::contains("elves-per-group: 3"));
}

#[test]
fn test_invalid_group_fails_before_running() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sc"));
    sandboxed(&mut cmd, &home);
    cmd.args(["run", "--elves", "2", "--group-size", "3"]);

    CargoCommand::from_std(cmd)
        .timeout(Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("can never form a group"));
}

#[test]
fn test_run_delivers_and_says_goodbye_once() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sc"));
    sandboxed(&mut cmd, &home);
    cmd.args([
        "run",
        "--max-work-ms",
        "2",
        "--max-vacation-ms",
        "20",
        "--seed",
        "3",
        "--no-color",
    ]);

    let output = CargoCommand::from_std(cmd)
        .timeout(Duration::from_secs(30))
        .output()
        .expect("run sc");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Off to deliver presents!").count(), 1);
    assert_eq!(stdout.matches("Merry Christmas").count(), 1);
    assert!(home.path().join("data/santaclaus/logs/santaclaus.log").exists());
}

#[test]
fn test_json_narration_is_one_object_per_line() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sc"));
    sandboxed(&mut cmd, &home);
    cmd.args(["run", "--elves", "0", "--max-vacation-ms", "0", "--format", "json"]);

    let output = CargoCommand::from_std(cmd)
        .timeout(Duration::from_secs(30))
        .output()
        .expect("run sc");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let types: Vec<String> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
            assert!(value.get("timestamp").is_some());
            value["type"].as_str().expect("type tag").to_string()
        })
        .collect();
    assert!(types.iter().any(|t| t == "SleighDeparted"));
    assert_eq!(types.iter().filter(|t| *t == "WorkshopClosed").count(), 1);
}

#[cfg(unix)]
#[test]
fn test_interrupt_cleans_up_once() {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sc"));
    sandboxed(&mut cmd, &home);
    cmd.args(["run", "--reindeer", "0", "--elves", "3", "--max-work-ms", "5", "--no-color"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = cmd.spawn().expect("spawn sc");
    let mut stdout = BufReader::new(child.stdout.take().expect("piped stdout"));

    // narration has started, so signal handlers are in place
    let mut first = String::new();
    stdout.read_line(&mut first).expect("first narration line");
    assert!(!first.is_empty());

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("send SIGINT");

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).expect("drain narration");
    let status = child.wait().expect("wait for sc");

    assert!(status.success(), "interrupt is an orderly shutdown, got {:?}", status);
    assert_eq!(rest.matches("Merry Christmas").count(), 1);
    assert!(!rest.contains("Off to deliver presents!"));
}
