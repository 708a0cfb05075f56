//! Input event collection.
//!
//! The collector turns raw OS input into a normalized [`InputEvent`] stream on
//! a bounded channel. The daemon only ever sees the receiving end.

pub mod types;

#[cfg(feature = "capture")]
pub mod listener;

#[cfg(not(feature = "capture"))]
pub mod noop;

use thiserror::Error;

// Re-export commonly used types
pub use types::{InputEvent, BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT};

#[cfg(feature = "capture")]
pub use listener::RdevCollector;

/// Platform-agnostic collector type alias
#[cfg(feature = "capture")]
pub type Collector = RdevCollector;

#[cfg(not(feature = "capture"))]
pub use noop::NoopCollector;

/// Platform-agnostic collector type alias
#[cfg(not(feature = "capture"))]
pub type Collector = NoopCollector;

/// Errors that can occur while starting event collection.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector is already running")]
    AlreadyRunning,
    #[error("input listener could not start: {0}")]
    ListenFailed(String),
    #[error("input capture not compiled in (rebuild with `--features capture`)")]
    CaptureDisabled,
}
