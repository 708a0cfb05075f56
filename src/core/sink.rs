//! Append-only CSV output for the per-minute rows.

use crate::core::counters::CountSnapshot;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// ISO-8601 with a colon-separated numeric offset, e.g. `2024-01-15T09:01:00+09:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Render a timestamp the way rows carry it.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// One CSV line, newline included:
/// `timestamp,mouse_move_distance,left_click_count,right_click_count,key_press_count`.
pub fn format_row<Tz>(timestamp: &DateTime<Tz>, counts: &CountSnapshot) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{},{},{},{},{}\n",
        format_timestamp(timestamp),
        counts.mouse_move_distance,
        counts.left_click_count,
        counts.right_click_count,
        counts.key_press_count
    )
}

/// An open hourly CSV file.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvSink {
    /// Open `path` for appending, creating it if needed. Existing rows are kept.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row and flush it straight through to the file.
    pub fn write_row<Tz>(&mut self, timestamp: &DateTime<Tz>, counts: &CountSnapshot) -> io::Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.writer
            .write_all(format_row(timestamp, counts).as_bytes())?;
        self.writer.flush()
    }

    /// Flush and close the file.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
