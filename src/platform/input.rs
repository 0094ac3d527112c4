//! Input capture
//!
//! Browser events arrive asynchronously between frames. They only ever
//! enqueue discrete [`Intent`]s here; the game drains them into a
//! [`TickInput`] at the start of each tick. Holding a key yields one intent,
//! not one per frame.

use std::collections::{HashSet, VecDeque};

use crate::sim::TickInput;

/// Minimum swipe travel (CSS px) to count as a gesture
pub const SWIPE_THRESHOLD: f32 = 40.0;
/// Pending intents beyond this are dropped
const MAX_PENDING: usize = 8;

/// Discrete player intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    LaneLeft,
    LaneRight,
    Jump,
}

/// Map a `KeyboardEvent.key` value to an intent
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Intent::LaneLeft),
        "ArrowRight" | "d" | "D" => Some(Intent::LaneRight),
        "ArrowUp" | "w" | "W" | " " => Some(Intent::Jump),
        _ => None,
    }
}

/// Tracks a single touch from start to end
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Finish the gesture. The dominant axis decides: horizontal travel
    /// shifts lanes, upward travel jumps. Short or downward swipes do nothing.
    pub fn end(&mut self, x: f32, y: f32) -> Option<Intent> {
        let (sx, sy) = self.start.take()?;
        let dx = x - sx;
        let dy = y - sy;
        if dx.abs() > dy.abs() {
            if dx > SWIPE_THRESHOLD {
                Some(Intent::LaneRight)
            } else if dx < -SWIPE_THRESHOLD {
                Some(Intent::LaneLeft)
            } else {
                None
            }
        } else if dy < -SWIPE_THRESHOLD {
            // Screen y grows downward
            Some(Intent::Jump)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

/// Edge-triggered intent queue
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: VecDeque<Intent>,
    held: HashSet<String>,
    swipe: SwipeTracker,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: Intent) {
        if self.pending.len() < MAX_PENDING {
            self.pending.push_back(intent);
        }
    }

    /// Key pressed. Auto-repeat and already-held keys are ignored.
    /// Returns the intent queued, if any.
    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        let intent = intent_for_key(key)?;
        if !self.held.insert(key.to_string()) {
            return None;
        }
        self.push(intent);
        Some(intent)
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.swipe.begin(x, y);
    }

    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<Intent> {
        let intent = self.swipe.end(x, y)?;
        self.push(intent);
        Some(intent)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drain intents for one tick. Each kind fires at most once per tick;
    /// a repeated intent stays queued for the following tick.
    pub fn take_tick_input(&mut self, autopilot: bool) -> TickInput {
        let mut input = TickInput {
            autopilot,
            ..TickInput::default()
        };
        while let Some(&intent) = self.pending.front() {
            let slot = match intent {
                Intent::LaneLeft => &mut input.lane_left,
                Intent::LaneRight => &mut input.lane_right,
                Intent::Jump => &mut input.jump,
            };
            if *slot {
                break;
            }
            *slot = true;
            self.pending.pop_front();
        }
        input
    }

    /// Drop everything (run reset, focus lost)
    pub fn clear(&mut self) {
        self.pending.clear();
        self.held.clear();
        self.swipe.cancel();
    }
}
