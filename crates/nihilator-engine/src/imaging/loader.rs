use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::DynamicImage;
use image::codecs::bmp::BmpDecoder;

use crate::coords::Rect;
use crate::error::{Error, Result};
use crate::texture::TextureBackend;

use super::format::TargetFormat;
use super::surface::{ConvertError, PixelSurface};

/// Decoder selected from a file extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecoderKind {
    /// Content-sniffing decoder for compressed formats.
    General,
    /// Uncompressed bitmap decoder; the fallback for unrecognized extensions.
    Bitmap,
}

impl DecoderKind {
    const COMPRESSED: [&'static str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "tif", "tiff"];

    /// Extension match is case-insensitive; no extension means bitmap.
    pub fn for_path(path: &Path) -> Self {
        let compressed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| Self::COMPRESSED.iter().any(|c| c.eq_ignore_ascii_case(ext)));

        if compressed { DecoderKind::General } else { DecoderKind::Bitmap }
    }
}

/// Loads image files into CPU surfaces or GPU textures.
///
/// Keeps at most one retained surface (see [`load_media`](Self::load_media))
/// and the target format captured from the first render target it sees.
#[derive(Debug, Default)]
pub struct ImageLoader {
    retained: Option<PixelSurface>,
    target: TargetFormat,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that the compressed-image decoder is available.
    pub fn init() -> Result<()> {
        if !image::ImageFormat::Png.reading_enabled() {
            let err = Error::init("image subsystem", "PNG decoding support is not compiled in");
            log::error!("{err}");
            return Err(err);
        }
        log::debug!("image subsystem initialized");
        Ok(())
    }

    #[inline]
    pub fn target_format(&self) -> TargetFormat {
        self.target
    }

    /// Captures the layout of a GPU render target, first writer wins.
    pub fn capture_target_format(&mut self, format: wgpu::TextureFormat) {
        if self.target.capture_wgpu(format) {
            log::debug!("image loader target format: {:?}", self.target);
        }
    }

    #[inline]
    pub fn retained(&self) -> Option<&PixelSurface> {
        self.retained.as_ref()
    }

    /// Decodes `path` and converts it to the captured target format.
    ///
    /// Failures are logged with the path and the decoder's message.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<PixelSurface> {
        let path = path.as_ref();
        let surface = decode_with(path, DecoderKind::for_path(path))
            .inspect_err(|e| log::error!("{e}"))?;
        Ok(self.optimize(path, surface))
    }

    /// Converts `surface` to the captured target format when there is one.
    ///
    /// A failed conversion is not an error: the unconverted surface is returned.
    pub fn optimize(&self, path: &Path, surface: PixelSurface) -> PixelSurface {
        let Some(format) = self.target.get() else { return surface };
        if surface.format() == format {
            return surface;
        }
        let converted = surface.convert(format);
        keep_converted_or_original(path, surface, converted)
    }

    /// Decodes `path` with the general decoder, skipping optimization.
    pub fn decode(path: impl AsRef<Path>) -> Result<PixelSurface> {
        let path = path.as_ref();
        decode_with(path, DecoderKind::General).inspect_err(|e| log::error!("{e}"))
    }

    /// Decodes `path` and uploads it through `backend`.
    ///
    /// The intermediate surface is dropped whether or not the upload succeeds.
    pub fn load_as_texture<B>(&self, path: impl AsRef<Path>, backend: &B) -> Result<B::Texture>
    where
        B: TextureBackend,
    {
        let path = path.as_ref();
        let surface = Self::decode(path)?;

        let uploaded = backend.upload(path, &surface);
        drop(surface);

        uploaded.inspect_err(|e| log::error!("{e}"))
    }

    /// Replaces the retained surface with a fresh load of `path`.
    ///
    /// The previous surface is released first, so a failed load leaves nothing
    /// retained.
    pub fn load_media(&mut self, path: impl AsRef<Path>) -> bool {
        self.retained = None;
        self.retained = self.load(path).ok();
        self.retained.is_some()
    }

    /// Copies the retained surface onto `target` at its top-left corner.
    ///
    /// The first target seen also becomes the optimization target format.
    pub fn render_to_surface(&mut self, target: &mut PixelSurface) -> bool {
        let Some(src) = self.retained.as_ref() else { return false };
        self.target.capture(Some(target.format()));

        src.blit_to(target, src.bounds());
        true
    }

    /// Like [`render_to_surface`](Self::render_to_surface), stretched to `width` x `height`.
    pub fn render_stretched(&mut self, target: &mut PixelSurface, width: u32, height: u32) -> bool {
        let Some(src) = self.retained.as_ref() else { return false };
        self.target.capture(Some(target.format()));

        src.blit_to(target, Rect::from_size(width, height));
        true
    }

    /// Frees the retained surface. The target format is only looked up, never
    /// owned, so it stays as captured.
    pub fn release(&mut self) {
        self.retained = None;
    }
}

fn keep_converted_or_original(
    path: &Path,
    original: PixelSurface,
    converted: std::result::Result<PixelSurface, ConvertError>,
) -> PixelSurface {
    match converted {
        Ok(surface) => surface,
        Err(e) => {
            log::warn!("unable to optimize image {}: {e}", path.display());
            original
        }
    }
}

fn decode_with(path: &Path, kind: DecoderKind) -> Result<PixelSurface> {
    let img = match kind {
        DecoderKind::General => image::ImageReader::open(path)
            .map_err(|e| Error::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| Error::decode(path, e))?
            .decode()
            .map_err(|e| Error::decode(path, e))?,

        DecoderKind::Bitmap => {
            let file = File::open(path).map_err(|e| Error::decode(path, e))?;
            let decoder =
                BmpDecoder::new(BufReader::new(file)).map_err(|e| Error::decode(path, e))?;
            DynamicImage::from_decoder(decoder).map_err(|e| Error::decode(path, e))?
        }
    };

    Ok(PixelSurface::from_rgba_image(img.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::PixelFormat;
    use crate::texture::testing::{write_fixture, MemoryBackend};

    use image::ImageFormat;

    #[test]
    fn extension_dispatch() {
        assert_eq!(DecoderKind::for_path(Path::new("a.png")), DecoderKind::General);
        assert_eq!(DecoderKind::for_path(Path::new("a.PNG")), DecoderKind::General);
        assert_eq!(DecoderKind::for_path(Path::new("dir/a.JpEg")), DecoderKind::General);
        assert_eq!(DecoderKind::for_path(Path::new("a.bmp")), DecoderKind::Bitmap);
        assert_eq!(DecoderKind::for_path(Path::new("a.dat")), DecoderKind::Bitmap);
        assert_eq!(DecoderKind::for_path(Path::new("noext")), DecoderKind::Bitmap);
        assert_eq!(DecoderKind::for_path(Path::new("dir.png/noext")), DecoderKind::Bitmap);
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn load_png_and_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_fixture(dir.path(), "a.png", ImageFormat::Png, 3, 2);
        let bmp = write_fixture(dir.path(), "b.bmp", ImageFormat::Bmp, 5, 4);

        let loader = ImageLoader::new();
        let a = loader.load(&png).unwrap();
        let b = loader.load(&bmp).unwrap();

        assert_eq!((a.width(), a.height(), a.format()), (3, 2, PixelFormat::Rgba8));
        assert_eq!((b.width(), b.height()), (5, 4));
        assert_eq!(a.pixel(0, 0), Some([255, 0, 255, 255]));
    }

    #[test]
    fn load_missing_file_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageLoader::new().load(dir.path().join("missing.png")).unwrap_err();
        match err {
            Error::DecodeFailed { path, .. } => assert!(path.ends_with("missing.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn png_bytes_behind_bmp_extension_fail_bitmap_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "fake.bmp", ImageFormat::Png, 2, 2);

        assert!(matches!(
            ImageLoader::new().load(&path),
            Err(Error::DecodeFailed { .. })
        ));
    }

    #[test]
    fn load_converts_to_captured_target_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", ImageFormat::Png, 2, 2);

        let mut loader = ImageLoader::new();
        loader.capture_target_format(wgpu::TextureFormat::Bgra8UnormSrgb);

        let s = loader.load(&path).unwrap();
        assert_eq!(s.format(), PixelFormat::Bgra8);
        assert_eq!(s.pixel(0, 0), Some([255, 0, 255, 255]));
    }

    #[test]
    fn unconvertible_target_leaves_surface_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", ImageFormat::Png, 2, 2);

        let mut loader = ImageLoader::new();
        loader.capture_target_format(wgpu::TextureFormat::Rgba16Float);
        assert_eq!(loader.target_format(), TargetFormat::Failed);

        assert_eq!(loader.load(&path).unwrap().format(), PixelFormat::Rgba8);
    }

    #[test]
    fn failed_conversion_falls_back_to_original() {
        let original = PixelSurface::new(1, 1, PixelFormat::Rgba8).unwrap();
        let kept = keep_converted_or_original(
            Path::new("x.png"),
            original,
            Err(ConvertError::OutOfMemory { bytes: 4 }),
        );
        assert_eq!(kept, PixelSurface::new(1, 1, PixelFormat::Rgba8).unwrap());
    }

    // ── load_as_texture ───────────────────────────────────────────────────

    #[test]
    fn load_as_texture_uploads_decoded_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "t.bmp", ImageFormat::Bmp, 7, 3);

        let backend = MemoryBackend::default();
        let tex = ImageLoader::new().load_as_texture(&path, &backend).unwrap();

        assert_eq!((tex.width, tex.height), (7, 3));
        assert_eq!(backend.uploads(), 1);
    }

    #[test]
    fn load_as_texture_reports_upload_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "t.png", ImageFormat::Png, 2, 2);

        let backend = MemoryBackend::failing();
        assert!(matches!(
            ImageLoader::new().load_as_texture(&path, &backend),
            Err(Error::UploadFailed { .. })
        ));
    }

    #[test]
    fn load_as_texture_missing_file_never_uploads() {
        let backend = MemoryBackend::default();
        let res = ImageLoader::new().load_as_texture("does/not/exist.png", &backend);
        assert!(matches!(res, Err(Error::DecodeFailed { .. })));
        assert_eq!(backend.uploads(), 0);
    }

    // ── retained surface ──────────────────────────────────────────────────

    #[test]
    fn render_to_surface_captures_first_target_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", ImageFormat::Png, 2, 2);

        let mut loader = ImageLoader::new();
        assert!(loader.load_media(&path));

        let mut screen = PixelSurface::new(4, 4, PixelFormat::Bgra8).unwrap();
        assert!(loader.render_to_surface(&mut screen));
        assert_eq!(loader.target_format().get(), Some(PixelFormat::Bgra8));
        assert_eq!(screen.pixel(1, 1), Some([255, 0, 255, 255]));
        assert_eq!(screen.pixel(2, 2), Some([0, 0, 0, 0]));

        let mut other = PixelSurface::new(4, 4, PixelFormat::Rgba8).unwrap();
        loader.render_to_surface(&mut other);
        assert_eq!(loader.target_format().get(), Some(PixelFormat::Bgra8));

        // Later loads follow the captured layout.
        assert!(loader.load_media(&path));
        assert_eq!(loader.retained().unwrap().format(), PixelFormat::Bgra8);
    }

    #[test]
    fn render_stretched_fills_requested_rect() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", ImageFormat::Png, 1, 1);

        let mut loader = ImageLoader::new();
        loader.load_media(&path);

        let mut screen = PixelSurface::new(4, 4, PixelFormat::Rgba8).unwrap();
        assert!(loader.render_stretched(&mut screen, 3, 3));
        assert_eq!(screen.pixel(2, 2), Some([255, 0, 255, 255]));
        assert_eq!(screen.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn render_without_retained_surface_fails() {
        let mut loader = ImageLoader::new();
        let mut screen = PixelSurface::new(1, 1, PixelFormat::Rgba8).unwrap();
        assert!(!loader.render_to_surface(&mut screen));
        assert!(loader.target_format().is_unset());
    }

    #[test]
    fn failed_load_media_drops_previous_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "a.png", ImageFormat::Png, 1, 1);

        let mut loader = ImageLoader::new();
        assert!(loader.load_media(&path));
        assert!(!loader.load_media(dir.path().join("gone.png")));
        assert!(loader.retained().is_none());
    }

    #[test]
    fn release_keeps_target_format() {
        let mut loader = ImageLoader::new();
        loader.capture_target_format(wgpu::TextureFormat::Rgba8Unorm);
        loader.release();
        loader.release();
        assert!(loader.retained().is_none());
        assert_eq!(loader.target_format().get(), Some(PixelFormat::Rgba8));
    }

    #[test]
    fn init_succeeds_with_png_enabled() {
        ImageLoader::init().unwrap();
    }
}
