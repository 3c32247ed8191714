//! Color model shared by the orchestrator and the renderer.

pub mod color;

pub use color::Color;
