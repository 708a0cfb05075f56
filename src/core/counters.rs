//! Per-minute activity counters.

use crate::collector::types::InputEvent;
use crate::core::classifier::{classify, PointerPosition};
use serde::{Deserialize, Serialize};

/// Running tally of activity since the last reset.
///
/// Owned by the daemon loop; nothing else writes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounters {
    /// Manhattan distance travelled by the pointer, in pixels
    pub mouse_move_distance: u64,
    pub left_click_count: u64,
    pub right_click_count: u64,
    pub key_press_count: u64,
}

/// An immutable copy of the counters, taken at a minute boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSnapshot {
    pub mouse_move_distance: u64,
    pub left_click_count: u64,
    pub right_click_count: u64,
    pub key_press_count: u64,
}

impl CountSnapshot {
    /// Whether no activity at all was recorded.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

impl ActivityCounters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the counters.
    pub fn accumulate(&mut self, pointer: &mut PointerPosition, event: &InputEvent) {
        classify(event, pointer, self);
    }

    /// Copy out the current values.
    pub fn snapshot(&self) -> CountSnapshot {
        CountSnapshot {
            mouse_move_distance: self.mouse_move_distance,
            left_click_count: self.left_click_count,
            right_click_count: self.right_click_count,
            key_press_count: self.key_press_count,
        }
    }

    /// Zero all four counters.
    ///
    /// Call only right after the snapshot that was just written out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_then_snapshot_is_zero() {
        let mut counters = ActivityCounters::new();
        let mut pointer = PointerPosition::default();

        counters.accumulate(&mut pointer, &InputEvent::KeyPress);
        counters.accumulate(&mut pointer, &InputEvent::ButtonPress(3));
        counters.accumulate(&mut pointer, &InputEvent::PointerMotion { x: 0, y: 0 });
        counters.accumulate(&mut pointer, &InputEvent::PointerMotion { x: 5, y: 5 });
        assert!(!counters.snapshot().is_idle());

        counters.reset();
        let snapshot = counters.snapshot();
        assert!(snapshot.is_idle());
        assert_eq!(snapshot, CountSnapshot::default());
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut counters = ActivityCounters::new();
        let mut pointer = PointerPosition::default();
        counters.accumulate(&mut pointer, &InputEvent::KeyPress);

        let snapshot = counters.snapshot();
        counters.accumulate(&mut pointer, &InputEvent::KeyPress);

        assert_eq!(snapshot.key_press_count, 1);
        assert_eq!(counters.key_press_count, 2);
    }

    #[test]
    fn test_reset_keeps_pointer_seed() {
        let mut counters = ActivityCounters::new();
        let mut pointer = PointerPosition::default();

        counters.accumulate(&mut pointer, &InputEvent::PointerMotion { x: 10, y: 10 });
        counters.reset();
        counters.accumulate(&mut pointer, &InputEvent::PointerMotion { x: 13, y: 6 });

        // Travel across a minute boundary still counts toward the new minute
        assert_eq!(counters.mouse_move_distance, 7);
    }
}
