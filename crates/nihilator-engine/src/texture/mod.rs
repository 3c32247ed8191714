//! GPU textures and the sprite-sheet wrapper around them.
//!
//! Uploading goes through [`TextureBackend`] so the wrapper and the loader do
//! not depend on a live device; [`RenderCtx`](crate::render::RenderCtx) is the
//! production backend.

mod backend;
mod sprite;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{GpuTexture, TextureBackend, TextureSize};
pub use sprite::{SpriteTexture, MAGENTA_KEY};
