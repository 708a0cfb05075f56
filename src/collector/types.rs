//! Normalized input events delivered by the collector.
//!
//! Only the three event kinds the tally cares about survive normalization.
//! Key identities are never carried, pointer positions only long enough to
//! compute travel distance.

use serde::{Deserialize, Serialize};

/// X11-style button id of the primary (left) button.
pub const BUTTON_LEFT: u32 = 1;

/// X11-style button id of the middle button.
pub const BUTTON_MIDDLE: u32 = 2;

/// X11-style button id of the secondary (right) button.
pub const BUTTON_RIGHT: u32 = 3;

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A key went down
    KeyPress,
    /// A pointer button went down, tagged with its button id
    ButtonPress(u32),
    /// The pointer moved to an absolute screen position
    PointerMotion { x: i32, y: i32 },
}

impl InputEvent {
    /// Create a motion event from floating point screen coordinates.
    ///
    /// Coordinates are rounded to the nearest pixel and saturate at the
    /// `i32` range.
    pub fn motion(x: f64, y: f64) -> Self {
        Self::PointerMotion {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }

    /// Whether this event came from the keyboard.
    pub fn is_keyboard(&self) -> bool {
        matches!(self, InputEvent::KeyPress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_rounds_coordinates() {
        assert_eq!(
            InputEvent::motion(10.4, 19.6),
            InputEvent::PointerMotion { x: 10, y: 20 }
        );
        assert_eq!(
            InputEvent::motion(-3.5, 0.0),
            InputEvent::PointerMotion { x: -4, y: 0 }
        );
    }

    #[test]
    fn test_motion_saturates() {
        assert_eq!(
            InputEvent::motion(1e12, f64::NEG_INFINITY),
            InputEvent::PointerMotion {
                x: i32::MAX,
                y: i32::MIN
            }
        );
    }

    #[test]
    fn test_keyboard_classification() {
        assert!(InputEvent::KeyPress.is_keyboard());
        assert!(!InputEvent::ButtonPress(BUTTON_LEFT).is_keyboard());
    }
}
