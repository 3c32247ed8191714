//! In-memory texture backend and on-disk image fixtures for unit tests.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::imaging::PixelSurface;

use super::{TextureBackend, TextureSize};

/// Texture recorded by [`MemoryBackend`]: dimensions plus the uploaded pixels
/// in straight RGBA order.
#[derive(Debug)]
pub struct MemoryTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<[u8; 4]>,
}

impl TextureSize for MemoryTexture {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    fail: bool,
    uploads: Cell<usize>,
    last_path: RefCell<Option<PathBuf>>,
}

impl MemoryBackend {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.get()
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.borrow().clone()
    }
}

impl TextureBackend for MemoryBackend {
    type Texture = MemoryTexture;

    fn upload(&self, path: &Path, surface: &PixelSurface) -> Result<MemoryTexture> {
        self.uploads.set(self.uploads.get() + 1);
        *self.last_path.borrow_mut() = Some(path.to_path_buf());

        if self.fail {
            return Err(Error::upload(path, "device lost"));
        }

        let mut rgba = Vec::new();
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                rgba.extend(surface.pixel(x, y));
            }
        }
        Ok(MemoryTexture { width: surface.width(), height: surface.height(), rgba })
    }
}

/// Checkerboard fixture: magenta where `x + y` is even, opaque green elsewhere.
pub const FIXTURE_OTHER: [u8; 4] = [10, 200, 30, 255];

pub fn write_fixture(dir: &Path, name: &str, format: ImageFormat, w: u32, h: u32) -> PathBuf {
    let img = RgbaImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 { Rgba([255, 0, 255, 255]) } else { Rgba(FIXTURE_OTHER) }
    });

    let img = match format {
        ImageFormat::Bmp => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };

    let path = dir.join(name);
    img.save_with_format(&path, format).unwrap();
    path
}
