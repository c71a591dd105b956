//! Deferred resync of the physical row order.
//!
//! Scrolling recycles rows without moving them in the DOM. The sorter
//! waits until both a minimum time and a minimum number of animation frames
//! have passed since the last recycle, and no touch gesture is active,
//! before it lets the body reorder its elements.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DomSortState {
    /// Nothing to do.
    Idle,
    /// Waiting for the delay and the frame count.
    Counting { started_at_ms: f64, frames: u32 },
    /// Both thresholds passed; waiting for the touch gesture to end.
    Ready,
}

#[derive(Debug, Clone)]
pub struct DomSorter {
    state: DomSortState,
    delay_ms: f64,
    required_frames: u32,
}

impl DomSorter {
    pub fn new(delay_ms: f64, required_frames: u32) -> Self {
        Self {
            state: DomSortState::Idle,
            delay_ms,
            required_frames,
        }
    }

    pub fn state(&self) -> DomSortState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state != DomSortState::Idle
    }

    /// Restart the countdown from `now_ms`.
    pub fn reschedule(&mut self, now_ms: f64) {
        self.state = DomSortState::Counting {
            started_at_ms: now_ms,
            frames: 0,
        };
    }

    pub fn cancel(&mut self) {
        self.state = DomSortState::Idle;
    }

    /// Advance by one animation frame. Returns `true` when the sort should
    /// run now; the sorter is then idle again.
    pub fn on_frame(&mut self, now_ms: f64, touch_active: bool) -> bool {
        if let DomSortState::Counting {
            started_at_ms,
            frames,
        } = self.state
        {
            let frames = frames.saturating_add(1);
            if frames >= self.required_frames && now_ms - started_at_ms >= self.delay_ms {
                self.state = DomSortState::Ready;
            } else {
                self.state = DomSortState::Counting {
                    started_at_ms,
                    frames,
                };
            }
        }
        if self.state == DomSortState::Ready && !touch_active {
            self.state = DomSortState::Idle;
            return true;
        }
        false
    }
}
