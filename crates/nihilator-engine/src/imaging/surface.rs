use thiserror::Error;

use crate::coords::Rect;

/// Byte layout of one pixel. Both layouts are 4 bytes, tightly packed rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
}

impl PixelFormat {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Byte offsets of (r, g, b, a) inside one pixel.
    #[inline]
    const fn offsets(self) -> [usize; 4] {
        match self {
            PixelFormat::Rgba8 => [0, 1, 2, 3],
            PixelFormat::Bgra8 => [2, 1, 0, 3],
        }
    }

    /// Maps a GPU render-target format onto a CPU layout.
    ///
    /// Returns `None` for formats that have no 8-bit RGBA/BGRA equivalent.
    pub fn from_wgpu(format: wgpu::TextureFormat) -> Option<Self> {
        match format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
                Some(PixelFormat::Rgba8)
            }
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
                Some(PixelFormat::Bgra8)
            }
            _ => None,
        }
    }

    /// GPU texture format holding this layout. Image files are sRGB encoded.
    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::Bgra8 => wgpu::TextureFormat::Bgra8UnormSrgb,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("surface of {width}x{height} pixels does not fit in memory")]
    SizeOverflow { width: u32, height: u32 },

    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

/// CPU-side pixel buffer.
///
/// Exactly one owner at a time; conversions produce a new surface and leave the
/// source for the caller to drop.
#[derive(Debug, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    format: PixelFormat,
    color_key: Option<[u8; 3]>,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Creates a zero-filled (transparent black) surface.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, ConvertError> {
        let bytes = byte_len(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| ConvertError::OutOfMemory { bytes })?;
        pixels.resize(bytes, 0);

        Ok(Self { width, height, format, color_key: None, pixels })
    }

    /// Wraps an existing buffer. Returns `None` if its length does not match
    /// `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(PixelFormat::BYTES_PER_PIXEL)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self { width, height, format, color_key: None, pixels })
    }

    pub(crate) fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            color_key: None,
            pixels: img.into_raw(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn color_key(&self) -> Option<[u8; 3]> {
        self.color_key
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Bytes per row.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.width as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Reads one pixel as straight `[r, g, b, a]`, whatever the layout.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = self.offset(x, y);
        let [r, g, b, a] = self.format.offsets();
        let px = &self.pixels[at..at + PixelFormat::BYTES_PER_PIXEL];
        Some([px[r], px[g], px[b], px[a]])
    }

    fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let at = self.offset(x, y);
        let offsets = self.format.offsets();
        for (channel, value) in offsets.into_iter().zip(rgba) {
            self.pixels[at + channel] = value;
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch() + x as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Makes every pixel whose RGB equals `key` fully transparent and records
    /// the key on the surface.
    pub fn apply_color_key(&mut self, key: [u8; 3]) {
        let [r, g, b, a] = self.format.offsets();
        for px in self.pixels.chunks_exact_mut(PixelFormat::BYTES_PER_PIXEL) {
            if [px[r], px[g], px[b]] == key {
                px[a] = 0;
            }
        }
        self.color_key = Some(key);
    }

    /// Returns a copy of this surface in `format`. The color key is preserved.
    pub fn convert(&self, format: PixelFormat) -> Result<PixelSurface, ConvertError> {
        let bytes = byte_len(self.width, self.height)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| ConvertError::OutOfMemory { bytes })?;

        let src = self.format.offsets();
        let dst = format.offsets();
        for px in self.pixels.chunks_exact(PixelFormat::BYTES_PER_PIXEL) {
            let mut out = [0u8; 4];
            for (s, d) in src.into_iter().zip(dst) {
                out[d] = px[s];
            }
            pixels.extend_from_slice(&out);
        }

        Ok(PixelSurface {
            width: self.width,
            height: self.height,
            format,
            color_key: self.color_key,
            pixels,
        })
    }

    /// Copies this surface into `dst` on `target`, scaling with nearest-neighbour
    /// sampling when sizes differ. Destination pixels outside `target` are
    /// skipped. Color-keyed source pixels are not copied.
    pub fn blit_to(&self, target: &mut PixelSurface, dst: Rect) {
        if self.width == 0 || self.height == 0 || dst.is_empty() {
            return;
        }
        let Some(visible) = dst.intersect(target.bounds()) else { return };

        for ty in visible.y..(visible.bottom() as i32) {
            let local_y = (ty - dst.y) as u64;
            let sy = (local_y * self.height as u64 / dst.h as u64) as u32;

            for tx in visible.x..(visible.right() as i32) {
                let local_x = (tx - dst.x) as u64;
                let sx = (local_x * self.width as u64 / dst.w as u64) as u32;

                let Some(rgba) = self.pixel(sx, sy) else { continue };
                if self.color_key == Some([rgba[0], rgba[1], rgba[2]]) {
                    continue;
                }
                target.put_pixel(tx as u32, ty as u32, rgba);
            }
        }
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, ConvertError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(PixelFormat::BYTES_PER_PIXEL))
        .ok_or(ConvertError::SizeOverflow { width, height })
}
