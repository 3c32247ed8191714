//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform` translates window-system events into `InputEvent`s.

mod poller;
mod types;

pub mod platform;

pub use poller::{InputPoller, KeyboardSnapshot};
pub use types::{InputEvent, Key, KeyState};
