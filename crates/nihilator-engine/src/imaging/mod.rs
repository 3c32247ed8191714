//! Image acquisition and pixel-format normalization.
//!
//! - `PixelSurface`: CPU-resident pixel buffer produced by file decode
//! - `TargetFormat`: lazily captured layout of the first render target seen
//! - `ImageLoader`: extension-dispatched decode, optional conversion to the
//!   captured layout, one-step decode + upload into a GPU texture

mod format;
mod loader;
mod surface;

pub use format::{FormatHandle, TargetFormat};
pub use loader::{DecoderKind, ImageLoader};
pub use surface::{ConvertError, PixelFormat, PixelSurface};
