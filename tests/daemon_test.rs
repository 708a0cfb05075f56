//! Integration tests driving the daemon loop over a channel

use chrono::Local;
use crossbeam_channel::bounded;
use input_tally::core::{ActivityDaemon, DaemonError, DaemonState, ShutdownToken, DEFAULT_TICK};
use input_tally::{Config, InputEvent};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn lock_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".lck"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_run_until_shutdown_requested() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("20240114_23.lck"), b"").unwrap();
    fs::write(dir.path().join("20240115_00.lck"), b"").unwrap();

    let config = Config::new(dir.path());
    config.validate().unwrap();

    let (sender, receiver) = bounded(64);
    let shutdown = ShutdownToken::new();
    let stop = shutdown.clone();

    let output_dir = config.output_dir.clone();
    let tick = config.tick;
    let worker = thread::spawn(move || {
        let mut daemon = ActivityDaemon::start(&output_dir, tick, &Local::now()).unwrap();
        let result = daemon.run(&receiver, &shutdown);
        (result, daemon.state(), daemon.stats())
    });

    // Give the daemon time to purge and open its window
    thread::sleep(Duration::from_millis(100));
    let active = lock_files(dir.path());
    assert_eq!(active.len(), 1, "locks while running: {active:?}");
    assert!(!active.contains(&"20240114_23.lck".to_string()));

    for _ in 0..3 {
        sender.send(InputEvent::KeyPress).unwrap();
    }
    sender.send(InputEvent::ButtonPress(1)).unwrap();
    sender.send(InputEvent::ButtonPress(99)).unwrap();
    thread::sleep(Duration::from_millis(100));

    stop.request();
    let (result, state, stats) = worker.join().unwrap();

    result.unwrap();
    assert_eq!(state, DaemonState::ShuttingDown);
    assert_eq!(stats.keyboard_events, 3);
    assert_eq!(stats.pointer_events, 2);
    assert!(lock_files(dir.path()).is_empty());

    let csv_count = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "csv").unwrap_or(false))
        .count();
    assert!(csv_count >= 1);
}

#[test]
fn test_collector_loss_is_fatal_and_cleans_up() {
    let dir = tempdir().unwrap();
    let (sender, receiver) = bounded(8);

    let mut daemon = ActivityDaemon::start(dir.path(), DEFAULT_TICK, &Local::now()).unwrap();
    assert_eq!(lock_files(dir.path()).len(), 1);

    let dropper = thread::spawn(move || {
        sender.send(InputEvent::PointerMotion { x: 1, y: 1 }).unwrap();
        thread::sleep(Duration::from_millis(50));
        drop(sender);
    });

    let err = daemon.run(&receiver, &ShutdownToken::new()).unwrap_err();
    dropper.join().unwrap();

    assert!(matches!(err, DaemonError::SourceDisconnected));
    assert_eq!(err.to_string(), "input event source disconnected");
    assert!(lock_files(dir.path()).is_empty());
    assert_eq!(daemon.stats().pointer_events, 1);
}
