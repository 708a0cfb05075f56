//! Transparency module for the input tally daemon.
//!
//! Tracks what a session processed and wrote, so an operator can audit the
//! daemon's activity without reading the CSV files.

pub mod log;

// Re-export commonly used types
pub use log::{SessionLog, SessionStats};
