//! GPU rendering subsystem.
//!
//! Frames are described as a [`SpriteBatch`] of textured quads and drawn by
//! [`TextureRenderer`] through wgpu.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a viewport uniform.

mod batch;
mod ctx;
mod textured;

pub use batch::{SpriteBatch, SpriteDraw};
pub use ctx::{RenderCtx, RenderTarget};
pub use textured::TextureRenderer;
