//! Nihilator engine crate.
//!
//! Window, GPU, image loading and keyboard input for a minimal 2D scaffold:
//! one image stretched over three fixed viewports, with an optional
//! sprite-sheet overlay.

pub mod coords;
pub mod device;
pub mod imaging;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod texture;
pub mod window;

mod error;

pub use error::{Error, Result};
