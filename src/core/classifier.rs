//! Mapping of input events onto counter mutations.
//!
//! Classification is infallible. Unknown buttons are dropped on purpose so
//! that extra mouse buttons (wheel clicks, thumb buttons) never skew the left
//! and right click counts.

use crate::collector::types::{InputEvent, BUTTON_LEFT, BUTTON_RIGHT};
use crate::core::counters::ActivityCounters;

/// Last observed pointer position, or unset before the first motion event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerPosition {
    last: Option<(i32, i32)>,
}

impl PointerPosition {
    /// The last observed position, if any.
    pub fn get(&self) -> Option<(i32, i32)> {
        self.last
    }

    /// Forget the last position; the next motion event only seeds it.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Move to `(x, y)`, returning the Manhattan distance from the previous
    /// position (zero when unset).
    fn advance(&mut self, x: i32, y: i32) -> u64 {
        let travelled = match self.last {
            Some((last_x, last_y)) => {
                let dx = (i64::from(x) - i64::from(last_x)).unsigned_abs();
                let dy = (i64::from(y) - i64::from(last_y)).unsigned_abs();
                dx + dy
            }
            None => 0,
        };
        self.last = Some((x, y));
        travelled
    }
}

/// Apply one event to the counters and pointer state.
pub fn classify(event: &InputEvent, pointer: &mut PointerPosition, counters: &mut ActivityCounters) {
    match *event {
        InputEvent::KeyPress => {
            counters.key_press_count = counters.key_press_count.saturating_add(1);
        }
        InputEvent::ButtonPress(BUTTON_LEFT) => {
            counters.left_click_count = counters.left_click_count.saturating_add(1);
        }
        InputEvent::ButtonPress(BUTTON_RIGHT) => {
            counters.right_click_count = counters.right_click_count.saturating_add(1);
        }
        InputEvent::ButtonPress(_) => {}
        InputEvent::PointerMotion { x, y } => {
            let travelled = pointer.advance(x, y);
            counters.mouse_move_distance = counters.mouse_move_distance.saturating_add(travelled);
        }
    }
}
