//! The daemon loop tying events, counters and output windows together.
//!
//! One thread does everything: a bounded wait on the event channel doubles
//! as the tick, after which the wall clock is checked for hour rotation and
//! then for a minute flush. Shutdown is cooperative and observed once per
//! iteration.

use crate::collector::types::InputEvent;
use crate::core::classifier::PointerPosition;
use crate::core::counters::ActivityCounters;
use crate::core::lockfile::LockFileManager;
use crate::core::window::{OpenError, WindowRotator};
use crate::transparency::{SessionLog, SessionStats};
use chrono::{DateTime, Local, TimeZone};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Default bounded wait per loop iteration.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Cooperative stop request shared between the signal handler and the loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop at the top of its next iteration.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Lifecycle of the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Running,
    ShuttingDown,
}

/// Conditions that stop the daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    OpenOutput(#[from] OpenError),
    #[error("unable to write row to {}: {source}", path.display())]
    WriteRow { path: PathBuf, source: io::Error },
    #[error("input event source disconnected")]
    SourceDisconnected,
}

/// Aggregates input activity into per-minute rows of hourly CSV files.
pub struct ActivityDaemon {
    rotator: Option<WindowRotator>,
    counters: ActivityCounters,
    pointer: PointerPosition,
    session: SessionLog,
    tick: Duration,
    state: DaemonState,
    closed_lock_failures: u64,
}

impl ActivityDaemon {
    /// Clear stale locks in `output_dir` and open the window containing `now`.
    ///
    /// The stale-lock purge is best-effort. Failing to open the initial CSV
    /// file is fatal.
    pub fn start<Tz>(
        output_dir: impl Into<PathBuf>,
        tick: Duration,
        now: &DateTime<Tz>,
    ) -> Result<Self, DaemonError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let locks = LockFileManager::new(output_dir);

        match locks.purge_stale() {
            Ok(removed) => {
                for path in removed {
                    tracing::info!(path = %path.display(), "removed stale lock file");
                }
            }
            Err(e) => {
                tracing::warn!(dir = %locks.output_dir().display(), error = %e, "could not scan for stale lock files");
            }
        }

        let rotator = WindowRotator::open(locks, now)?;
        tracing::info!(
            bucket = %rotator.window().bucket(),
            csv = %rotator.csv_path().display(),
            "activity daemon started"
        );

        Ok(Self {
            rotator: Some(rotator),
            counters: ActivityCounters::new(),
            pointer: PointerPosition::default(),
            session: SessionLog::new(),
            tick,
            state: DaemonState::Running,
            closed_lock_failures: 0,
        })
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Counts accumulated since the last flushed row.
    pub fn counters(&self) -> &ActivityCounters {
        &self.counters
    }

    /// The active window, until shutdown.
    pub fn rotator(&self) -> Option<&WindowRotator> {
        self.rotator.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats(self.lock_failures())
    }

    /// Fold one input event into the counters.
    pub fn accept(&mut self, event: InputEvent) {
        if event.is_keyboard() {
            self.session.record_keyboard_event();
        } else {
            self.session.record_pointer_event();
        }
        self.counters.accumulate(&mut self.pointer, &event);
    }

    /// Act on the wall clock: rotate on an hour change, then flush a row on a
    /// minute change.
    ///
    /// Rotation runs first so the row for the last minute of an hour lands
    /// in the new hour's file, next to the timestamp it carries.
    pub fn step<Tz>(&mut self, now: &DateTime<Tz>) -> Result<(), DaemonError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(rotator) = self.rotator.as_mut() else {
            return Ok(());
        };

        if rotator.hour_changed(now) {
            rotator.rotate(now)?;
            self.session.record_rotation();
        }

        if rotator.minute_changed(now) {
            let counts = self.counters.snapshot();
            rotator
                .write_row(now, &counts)
                .map_err(|source| DaemonError::WriteRow {
                    path: rotator.csv_path().to_path_buf(),
                    source,
                })?;
            self.counters.reset();
            self.session.record_row_written();
            tracing::debug!(
                distance = counts.mouse_move_distance,
                left = counts.left_click_count,
                right = counts.right_click_count,
                keys = counts.key_press_count,
                "flushed minute row"
            );
        }

        Ok(())
    }

    /// Run until `shutdown` is requested or a fatal error occurs.
    ///
    /// Terminal actions (lock removal, file close) run in both cases.
    pub fn run(
        &mut self,
        events: &Receiver<InputEvent>,
        shutdown: &ShutdownToken,
    ) -> Result<(), DaemonError> {
        let result = self.run_loop(events, shutdown);
        if let Err(ref e) = result {
            tracing::error!(error = %e, "stopping on fatal error");
        }
        self.shutdown();
        result
    }

    fn run_loop(
        &mut self,
        events: &Receiver<InputEvent>,
        shutdown: &ShutdownToken,
    ) -> Result<(), DaemonError> {
        while !shutdown.is_requested() {
            match events.recv_timeout(self.tick) {
                Ok(event) => {
                    self.accept(event);
                    for event in events.try_iter() {
                        self.accept(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DaemonError::SourceDisconnected);
                }
            }

            self.step(&Local::now())?;

            thread::sleep(self.tick);
        }

        tracing::info!("shutdown requested");
        Ok(())
    }

    /// Remove the active lock and close the active file.
    ///
    /// Counts of the unfinished minute are dropped. Returns the session
    /// statistics the first time it is called and `None` afterwards.
    pub fn shutdown(&mut self) -> Option<SessionStats> {
        if self.state == DaemonState::ShuttingDown {
            return None;
        }
        self.state = DaemonState::ShuttingDown;

        if let Some(rotator) = self.rotator.take() {
            let csv = rotator.csv_path().to_path_buf();
            let (lock_failures, closed) = rotator.close();
            self.closed_lock_failures = lock_failures;
            if let Err(e) = closed {
                tracing::warn!(path = %csv.display(), error = %e, "error closing CSV file");
            }
        }

        let stats = self.stats();
        tracing::info!(
            rows = stats.rows_written,
            rotations = stats.rotations,
            "activity daemon stopped"
        );
        Some(stats)
    }

    fn lock_failures(&self) -> u64 {
        self.rotator
            .as_ref()
            .map(WindowRotator::lock_failures)
            .unwrap_or(self.closed_lock_failures)
    }
}

impl Drop for ActivityDaemon {
    fn drop(&mut self) {
        self.shutdown();
    }
}
