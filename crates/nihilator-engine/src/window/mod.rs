//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer,
//! the image loader and the input poller.

mod runtime;

pub use runtime::{GameCore, RuntimeConfig};
