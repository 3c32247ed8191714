use std::path::Path;

use crate::coords::Rect;
use crate::imaging::ImageLoader;
use crate::render::SpriteBatch;

use super::{TextureBackend, TextureSize};

/// Color treated as transparent in sprite sheets (full red, zero green, full blue).
pub const MAGENTA_KEY: [u8; 3] = [0xFF, 0x00, 0xFF];

/// Owns at most one texture plus the clip rectangles cut from it.
///
/// Width and height are those of the decoded image while a texture is held and
/// zero otherwise.
#[derive(Debug)]
pub struct SpriteTexture<T> {
    texture: Option<T>,
    width: u32,
    height: u32,
    clips: Vec<Rect>,
}

impl<T> Default for SpriteTexture<T> {
    fn default() -> Self {
        Self {
            texture: None,
            width: 0,
            height: 0,
            clips: Vec::new(),
        }
    }
}

impl<T: TextureSize> SpriteTexture<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held texture with `path`, color-keyed with [`MAGENTA_KEY`].
    ///
    /// The previous texture is released before decoding, so any failure leaves
    /// the wrapper empty.
    pub fn load_from_file<B>(&mut self, backend: &B, path: impl AsRef<Path>) -> bool
    where
        B: TextureBackend<Texture = T>,
    {
        self.release();

        let path = path.as_ref();
        let Ok(mut surface) = ImageLoader::decode(path) else { return false };
        surface.apply_color_key(MAGENTA_KEY);

        match backend.upload(path, &surface) {
            Ok(texture) => {
                self.width = surface.width();
                self.height = surface.height();
                self.texture = Some(texture);
                true
            }
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }

    /// Cuts `count` clips of `clip_width` x `clip_height` in a two-column grid:
    /// clip `i` sits at column `i % 2`, row `i / 2`. Replaces previous clips.
    ///
    /// Clips whose origin does not fit in `i32` are skipped; once a row is out
    /// of range no later clip is cut.
    pub fn define_clips(&mut self, count: usize, clip_width: u32, clip_height: u32) {
        self.clips.clear();
        self.clips.extend(
            (0..count)
                .map_while(|i| {
                    let row = i64::try_from(i / 2).ok()?;
                    let y = i32::try_from(row.checked_mul(i64::from(clip_height))?).ok()?;
                    let x = i32::try_from((i % 2) as i64 * i64::from(clip_width)).ok();
                    Some(x.map(|x| Rect::new(x, y, clip_width, clip_height)))
                })
                .flatten(),
        );

        if self.clips.len() < count {
            log::warn!(
                "cut {} of {count} {clip_width}x{clip_height} clips, the rest lie outside the addressable range",
                self.clips.len()
            );
        }
    }

    #[inline]
    pub fn clips(&self) -> &[Rect] {
        &self.clips
    }

    /// Queues a draw with its top-left corner at (`x`, `y`).
    ///
    /// With a clip only that part of the texture is drawn, at the clip's size;
    /// otherwise the whole texture at its native size. Nothing is queued when
    /// no texture is held.
    pub fn render<'t>(&'t self, batch: &mut SpriteBatch<'t, T>, x: i32, y: i32, clip: Option<Rect>) {
        let Some(texture) = self.texture.as_ref() else { return };

        let (w, h) = match clip {
            Some(c) => (c.w, c.h),
            None => (self.width, self.height),
        };
        batch.push(texture, Rect::new(x, y, w, h), clip);
    }

    /// Destroys the texture if one is held. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.texture.take().is_some() {
            self.width = 0;
            self.height = 0;
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }

    #[inline]
    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}
