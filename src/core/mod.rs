//! Core functionality for the input tally daemon.
//!
//! This module contains:
//! - Event classification into per-minute counters
//! - Hourly window rotation with lock files
//! - CSV row output
//! - The daemon loop driving all of the above

pub mod classifier;
pub mod counters;
pub mod daemon;
pub mod lockfile;
pub mod sink;
pub mod window;

// Re-export commonly used types
pub use classifier::{classify, PointerPosition};
pub use counters::{ActivityCounters, CountSnapshot};
pub use daemon::{ActivityDaemon, DaemonError, DaemonState, ShutdownToken, DEFAULT_TICK};
pub use lockfile::{LockFileManager, LOCK_EXTENSION};
pub use sink::{format_row, format_timestamp, CsvSink};
pub use window::{bucket_id, minute_changed, MinuteMark, OpenError, TimeWindow, WindowRotator};
