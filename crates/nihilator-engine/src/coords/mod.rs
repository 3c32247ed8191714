//! Geometry shared by the loader, the texture wrapper and the renderer.
//!
//! Canonical space:
//! - Physical pixels of the render target
//! - Origin top-left
//! - +X right, +Y down
//!
//! The textured renderer converts to NDC in its shader using the viewport size.

mod rect;
mod viewport;

pub use rect::Rect;
pub use viewport::{Viewport, Viewports};
