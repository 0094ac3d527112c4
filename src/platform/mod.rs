//! Platform abstraction layer
//!
//! Host-side plumbing that sits between browser/native events and the
//! simulation:
//! - Input events (keyboard and touch swipes) folded into edge-triggered intents
//! - Frame time (delta clamping and the fixed-step accumulator)
//!
//! Storage lives in [`crate::persistence`].

pub mod input;
pub mod time;

pub use input::{InputQueue, Intent, SwipeTracker, intent_for_key};
pub use time::FrameClock;
