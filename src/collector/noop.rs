//! Fallback collector used when the crate is built without `capture`.
//!
//! This exists so the crate (and binary) can compile on hosts without the
//! system input libraries `rdev` links against. It never produces events and
//! refuses to start, which the daemon treats as an unavailable event source.

use crate::collector::types::InputEvent;
use crate::collector::CollectorError;
use crossbeam_channel::{bounded, Receiver, Sender};

/// A collector that never emits events.
pub struct NoopCollector {
    _sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl NoopCollector {
    /// Create a new noop collector.
    pub fn new() -> Self {
        let (sender, receiver) = bounded(1);
        Self {
            _sender: sender,
            receiver,
        }
    }

    /// Always fails: there is nothing to capture with.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        Err(CollectorError::CaptureDisabled)
    }

    /// Nothing to stop.
    pub fn stop(&mut self) {}

    /// A noop collector is never running.
    pub fn is_running(&self) -> bool {
        false
    }

    /// Get the receiver for input events.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }
}

impl Default for NoopCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_reports_capture_disabled() {
        let mut collector = NoopCollector::new();
        assert!(matches!(
            collector.start(),
            Err(CollectorError::CaptureDisabled)
        ));
        assert!(!collector.is_running());
        assert!(collector.receiver().try_recv().is_err());
    }
}
