//! Session statistics for the running daemon.
//!
//! Tracks how much the daemon processed and wrote, so an operator can see at
//! shutdown what a session produced. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters describing one daemon session.
#[derive(Debug, Clone)]
pub struct SessionLog {
    keyboard_events: u64,
    pointer_events: u64,
    rows_written: u64,
    rotations: u64,
    session_start: DateTime<Utc>,
}

impl SessionLog {
    /// Start a new session log.
    pub fn new() -> Self {
        Self {
            keyboard_events: 0,
            pointer_events: 0,
            rows_written: 0,
            rotations: 0,
            session_start: Utc::now(),
        }
    }

    pub fn record_keyboard_event(&mut self) {
        self.keyboard_events += 1;
    }

    pub fn record_pointer_event(&mut self) {
        self.pointer_events += 1;
    }

    pub fn record_row_written(&mut self) {
        self.rows_written += 1;
    }

    pub fn record_rotation(&mut self) {
        self.rotations += 1;
    }

    /// Get the current statistics. Lock failures are tracked by the rotator
    /// and passed in.
    pub fn stats(&self, lock_failures: u64) -> SessionStats {
        SessionStats {
            keyboard_events: self.keyboard_events,
            pointer_events: self.pointer_events,
            rows_written: self.rows_written,
            rotations: self.rotations,
            lock_failures,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start)
                .num_seconds()
                .max(0) as u64,
        }
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub keyboard_events: u64,
    pub pointer_events: u64,
    pub rows_written: u64,
    pub rotations: u64,
    pub lock_failures: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

impl SessionStats {
    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Session Statistics:\n\
             - Keyboard events processed: {}\n\
             - Pointer events processed: {}\n\
             - Rows written: {}\n\
             - Hourly rotations: {}\n\
             - Lock file failures: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - No key identities recorded\n\
             - Pointer positions discarded after distance is computed\n\
             - Only per-minute totals written to disk",
            self.keyboard_events,
            self.pointer_events,
            self.rows_written,
            self.rotations,
            self.lock_failures,
            self.session_duration_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_log_counting() {
        let mut log = SessionLog::new();

        log.record_keyboard_event();
        log.record_keyboard_event();
        log.record_pointer_event();
        log.record_row_written();
        log.record_rotation();

        let stats = log.stats(2);
        assert_eq!(stats.keyboard_events, 2);
        assert_eq!(stats.pointer_events, 1);
        assert_eq!(stats.rows_written, 1);
        assert_eq!(stats.rotations, 1);
        assert_eq!(stats.lock_failures, 2);
    }

    #[test]
    fn test_summary_format() {
        let summary = SessionLog::new().stats(0).summary();

        assert!(summary.contains("Keyboard events"));
        assert!(summary.contains("Rows written: 0"));
        assert!(summary.contains("Privacy Guarantee"));
        assert!(summary.contains("No key identities recorded"));
    }
}
