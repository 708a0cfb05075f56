//! System-wide event collection backed by `rdev`.
//!
//! `rdev::listen` installs an OS-level hook (XRecord on X11, an event tap on
//! macOS, low-level hooks on Windows) and blocks its thread for the lifetime
//! of the process. Events are normalized and pushed into a bounded channel
//! which the daemon drains.

use crate::collector::types::InputEvent;
use crate::collector::CollectorError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rdev::{listen, Button, Event, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long `start` waits for the hook to report an immediate failure.
const STARTUP_GRACE: Duration = Duration::from_millis(250);

/// Channel capacity; events beyond this are dropped instead of blocking the hook.
const CHANNEL_CAPACITY: usize = 10_000;

/// The `rdev` event collector.
pub struct RdevCollector {
    sender: Option<Sender<InputEvent>>,
    receiver: Receiver<InputEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl RdevCollector {
    /// Create a new collector. Nothing is captured until [`start`](Self::start).
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);

        Self {
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start capturing events in a background thread.
    ///
    /// The sender moves into the listener thread, so if the hook ever dies
    /// the channel disconnects and the consumer finds out.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        let sender = self.sender.take().ok_or(CollectorError::AlreadyRunning)?;

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let (status_tx, status_rx) = bounded::<String>(1);

        let handle = thread::Builder::new()
            .name("input-listener".into())
            .spawn(move || {
                let hook_running = running.clone();
                let result = listen(move |event| {
                    if !hook_running.load(Ordering::Relaxed) {
                        return;
                    }
                    if let Some(input) = normalize(&event) {
                        // Don't block the OS hook if the channel is full
                        let _ = sender.try_send(input);
                    }
                });
                if let Err(e) = result {
                    tracing::error!(error = ?e, "input listener failed");
                    let _ = status_tx.send(format!("{e:?}"));
                }
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| CollectorError::ListenFailed(e.to_string()))?;

        self.thread_handle = Some(handle);

        match status_rx.recv_timeout(STARTUP_GRACE) {
            Ok(reason) => Err(CollectorError::ListenFailed(reason)),
            // Still listening after the grace period, or exited cleanly
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(()),
        }
    }

    /// Stop forwarding events.
    ///
    /// `rdev` offers no way to unhook, so the listener thread is detached and
    /// simply discards everything from here on.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.thread_handle.take();
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for input events.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }
}

impl Default for RdevCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RdevCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Convert an `rdev` event into an [`InputEvent`].
///
/// Releases and wheel events carry nothing the tally counts.
fn normalize(event: &Event) -> Option<InputEvent> {
    match event.event_type {
        EventType::KeyPress(_) => Some(InputEvent::KeyPress),
        EventType::ButtonPress(button) => Some(InputEvent::ButtonPress(button_id(button))),
        EventType::MouseMove { x, y } => Some(InputEvent::motion(x, y)),
        _ => None,
    }
}

fn button_id(button: Button) -> u32 {
    match button {
        Button::Left => 1,
        Button::Middle => 2,
        Button::Right => 3,
        Button::Unknown(id) => u32::from(id),
    }
}
