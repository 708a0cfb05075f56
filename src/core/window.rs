//! Hourly output windows and minute bookkeeping.
//!
//! Each wall-clock hour gets its own bucket, `YYYYMMDD_HH`, naming one CSV
//! file and one lock file. The rotator owns the open file of the active
//! bucket, its lock, and the last minute a row was written for.

use crate::core::counters::CountSnapshot;
use crate::core::lockfile::LockFileManager;
use crate::core::sink::CsvSink;
use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hour-granularity bucket identifier (`YYYYMMDD_HH`) for a timestamp.
///
/// The full date is part of the identifier, so the same hour on different
/// days never collides.
pub fn bucket_id<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%Y%m%d_%H").to_string()
}

/// A minute of local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteMark {
    date: NaiveDate,
    hour: u32,
    minute: u32,
}

impl MinuteMark {
    pub fn of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            date: now.date_naive(),
            hour: now.hour(),
            minute: now.minute(),
        }
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

/// The active hour bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    bucket: String,
    date: NaiveDate,
    hour: u32,
}

impl TimeWindow {
    pub fn at<Tz>(now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            bucket: bucket_id(now),
            date: now.date_naive(),
            hour: now.hour(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Whether `now` falls outside this window.
    ///
    /// Compares the date as well as the hour number, so a clock jump of
    /// exactly a day still rotates.
    pub fn hour_changed<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.hour() != self.hour || now.date_naive() != self.date
    }

    /// CSV path of this window inside `output_dir`.
    pub fn csv_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.csv", self.bucket))
    }
}

/// Whether `now` is in a different minute than the last observed one.
pub fn minute_changed<Tz: TimeZone>(now: &DateTime<Tz>, last_minute: MinuteMark) -> bool {
    MinuteMark::of(now) != last_minute
}

/// A window's CSV file could not be opened.
#[derive(Debug, Error)]
#[error("unable to open CSV file {}: {source}", path.display())]
pub struct OpenError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// Owns the active window, its CSV file and its lock file.
#[derive(Debug)]
pub struct WindowRotator {
    locks: LockFileManager,
    window: TimeWindow,
    lock_path: PathBuf,
    sink: CsvSink,
    last_minute: MinuteMark,
    lock_failures: u64,
}

impl WindowRotator {
    /// Open the window containing `now`.
    ///
    /// Fails only if the CSV file cannot be opened; a lock file that cannot
    /// be created is logged and ignored.
    pub fn open<Tz>(locks: LockFileManager, now: &DateTime<Tz>) -> Result<Self, OpenError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let window = TimeWindow::at(now);
        let sink = open_sink(&window, locks.output_dir())?;
        let lock_path = locks.path_for(window.bucket());

        let mut rotator = Self {
            locks,
            window,
            lock_path,
            sink,
            last_minute: MinuteMark::of(now),
            lock_failures: 0,
        };
        rotator.create_lock();
        Ok(rotator)
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn csv_path(&self) -> &Path {
        self.sink.path()
    }

    pub fn last_minute(&self) -> MinuteMark {
        self.last_minute
    }

    /// Lock files that could not be created or removed so far.
    pub fn lock_failures(&self) -> u64 {
        self.lock_failures
    }

    pub fn hour_changed<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.window.hour_changed(now)
    }

    pub fn minute_changed<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        minute_changed(now, self.last_minute)
    }

    /// Move to the window containing `now`.
    ///
    /// The previous lock is removed first. If the new CSV file cannot be
    /// opened the previous file stays open and the error is returned; the
    /// caller is expected to stop. On success the previous file is closed
    /// and a lock for the new bucket is created.
    pub fn rotate<Tz>(&mut self, now: &DateTime<Tz>) -> Result<(), OpenError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.delete_lock();

        let window = TimeWindow::at(now);
        let sink = open_sink(&window, self.locks.output_dir())?;

        let previous = std::mem::replace(&mut self.sink, sink);
        if let Err(e) = previous.close() {
            tracing::warn!(path = %self.window.csv_path(self.locks.output_dir()).display(), error = %e, "error closing previous CSV file");
        }

        tracing::info!(from = %self.window.bucket(), to = %window.bucket(), "rotated output window");

        self.lock_path = self.locks.path_for(window.bucket());
        self.window = window;
        self.create_lock();
        Ok(())
    }

    /// Write the row for the minute that just ended and remember `now`'s minute.
    ///
    /// On error the minute is not marked, so the caller still owns the
    /// unwritten counts.
    pub fn write_row<Tz>(&mut self, now: &DateTime<Tz>, counts: &CountSnapshot) -> io::Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.sink.write_row(now, counts)?;
        self.last_minute = MinuteMark::of(now);
        Ok(())
    }

    /// Remove the lock and close the file.
    ///
    /// Returns the lock failure count including the final removal, along
    /// with the result of closing the file.
    pub fn close(mut self) -> (u64, io::Result<()>) {
        self.delete_lock();
        (self.lock_failures, self.sink.close())
    }

    fn create_lock(&mut self) {
        if let Err(e) = self.locks.create(&self.lock_path) {
            self.lock_failures += 1;
            tracing::warn!(path = %self.lock_path.display(), error = %e, "could not create lock file");
        }
    }

    fn delete_lock(&mut self) {
        if let Err(e) = self.locks.delete(&self.lock_path) {
            self.lock_failures += 1;
            tracing::warn!(path = %self.lock_path.display(), error = %e, "could not remove lock file");
        }
    }
}

fn open_sink(window: &TimeWindow, output_dir: &Path) -> Result<CsvSink, OpenError> {
    let path = window.csv_path(output_dir);
    CsvSink::open(&path).map_err(|source| OpenError { path, source })
}
