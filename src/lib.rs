//! Input Tally - per-minute keyboard and mouse activity counts.
//!
//! This library runs a lightweight background daemon that counts
//! keystrokes, left and right clicks, and pointer travel distance, and
//! appends one row per minute to an hourly CSV file.
//!
//! # Privacy Guarantees
//!
//! - **No key content**: Only the fact that a key went down is counted
//! - **No coordinates on disk**: Pointer positions only feed a distance sum
//! - **Aggregates only**: Nothing finer than a one-minute total is written
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Input Tally                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Collector  │──▶│ Classifier  │──▶│  Counters   │        │
//! │  │   (rdev)    │   │             │   │ (1 minute)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ Lock files  │◀──│  Rotator    │──▶│  CSV sink   │        │
//! │  │  (*.lck)    │   │  (1 hour)   │   │  (*.csv)    │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Output
//!
//! One file per hour, `<output_dir>/YYYYMMDD_HH.csv`, with rows of
//!
//! ```text
//! 2024-01-15T09:06:00+09:00,1520,4,1,87
//! ```
//!
//! (timestamp, mouse travel, left clicks, right clicks, key presses). While
//! a file is being written an empty `YYYYMMDD_HH.lck` sits next to it.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use input_tally::{collector, core};
//!
//! let mut collector = collector::Collector::new();
//! collector.start().expect("Failed to start collector");
//!
//! let shutdown = core::ShutdownToken::new();
//! let mut daemon =
//!     core::ActivityDaemon::start("/var/lib/input-tally", core::DEFAULT_TICK, &Local::now())
//!         .expect("Failed to open output");
//! daemon.run(collector.receiver(), &shutdown).expect("Daemon stopped");
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorError, InputEvent};
pub use config::{Config, ConfigError};
pub use core::{
    ActivityCounters, ActivityDaemon, CountSnapshot, DaemonError, DaemonState, ShutdownToken,
};
pub use transparency::{SessionLog, SessionStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
