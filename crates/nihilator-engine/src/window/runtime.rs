use std::path::PathBuf;

use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::{Viewport, Viewports};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::{Error, Result};
use crate::imaging::ImageLoader;
use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputPoller, Key, KeyState};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget, SpriteBatch, TextureRenderer};
use crate::texture::{GpuTexture, SpriteTexture};

/// Window and asset configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Image stretched into every viewport.
    pub default_image: PathBuf,
    /// Sprite sheet whose four clips are drawn in the screen corners.
    pub sprite_sheet: Option<PathBuf>,
    pub clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Nihilator".to_string(),
            width: 640,
            height: 480,
            default_image: PathBuf::from("images/default.bmp"),
            sprite_sheet: None,
            clear_color: Color::BLACK,
        }
    }
}

/// Sprite-sheet layout: four 100x100 clips in a 2x2 grid.
const SPRITE_CLIPS: usize = 4;
const SPRITE_CLIP_SIZE: u32 = 100;

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Owns the window, the renderer and everything drawn with it, and drives
/// the event loop.
pub struct GameCore {
    config: RuntimeConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    viewports: Option<Viewports>,
    renderer: TextureRenderer,

    loader: ImageLoader,
    texture: Option<GpuTexture>,
    sprites: SpriteTexture<GpuTexture>,
    input: InputPoller,

    failure: Option<Error>,
}

impl GameCore {
    pub fn new(config: RuntimeConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            viewports: None,
            renderer: TextureRenderer::new(),
            loader: ImageLoader::new(),
            texture: None,
            sprites: SpriteTexture::new(),
            input: InputPoller::new(),
            failure: None,
        }
    }

    /// Runs until the window is closed.
    ///
    /// A failed [`init`](Self::init) stops the loop and is returned. Asset
    /// failures are logged and the loop keeps drawing a cleared screen.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        event_loop
            .run_app(&mut *self)
            .context("winit event loop terminated with error")?;

        self.teardown();

        match self.failure.take() {
            Some(e) => Err(anyhow::Error::new(e).context("startup failed")),
            None => Ok(()),
        }
    }

    /// Creates the window and renderer, starts the image subsystem and splits
    /// the screen into viewports.
    ///
    /// Resources created before a failing step are kept until [`teardown`](Self::teardown).
    pub fn init(&mut self, event_loop: &ActiveEventLoop) -> bool {
        match self.try_init(event_loop) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{e}");
                self.failure = Some(e);
                false
            }
        }
    }

    fn try_init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| Error::init("window", e))?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .map_err(|e| Error::init("renderer", format!("{e:#}")))?;

        let (format, size) = entry.with_gpu(|gpu| (gpu.surface_format(), gpu.size()));
        self.entry = Some(entry);

        ImageLoader::init()?;
        self.loader.capture_target_format(format);

        let viewports = Viewports::split(size.width, size.height);
        log::debug!("viewports: {viewports:?}");
        self.viewports = Some(viewports);

        log::info!("{} initialized at {}x{}", self.config.title, size.width, size.height);
        Ok(())
    }

    /// Replaces the active texture with `path`.
    ///
    /// The old texture is released first, so a failed load leaves none.
    pub fn load_media(&mut self, path: impl Into<PathBuf>) -> bool {
        self.texture = None;

        let path = path.into();
        let Some(entry) = self.entry.as_ref() else {
            log::error!("cannot load {} before the renderer exists", path.display());
            return false;
        };

        let loader = &self.loader;
        let loaded = entry.with_gpu(|gpu| loader.load_as_texture(&path, &render_ctx(gpu)));
        self.texture = loaded.ok();
        self.texture.is_some()
    }

    /// Loads the sprite sheet and cuts its corner clips.
    pub fn load_sprite_sheet(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let Some(entry) = self.entry.as_ref() else {
            log::error!("cannot load {} before the renderer exists", path.display());
            return false;
        };

        let sprites = &mut self.sprites;
        if !entry.with_gpu(|gpu| sprites.load_from_file(&render_ctx(gpu), &path)) {
            return false;
        }
        sprites.define_clips(SPRITE_CLIPS, SPRITE_CLIP_SIZE, SPRITE_CLIP_SIZE);
        true
    }

    /// Draws one frame and presents it.
    ///
    /// Returns false when the surface failed fatally and the loop should stop.
    pub fn render_viewports(&mut self) -> bool {
        let (Some(entry), Some(viewports)) = (self.entry.as_mut(), self.viewports) else {
            return true;
        };

        let renderer = &mut self.renderer;
        let texture = self.texture.as_ref();
        let clear_color = self.config.clear_color;

        let action = entry.with_gpu_mut(|gpu| {
            let mut frame = match gpu.begin_frame() {
                Ok(frame) => frame,
                Err(e) => return Some(gpu.handle_surface_error(e)),
            };

            {
                let ctx = render_ctx(gpu);
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                target.clear(clear_color);

                let batch = build_frame_batch(texture, &viewports);
                renderer.render(&ctx, &mut target, &batch);
            }

            gpu.submit(frame);
            None
        });

        match action {
            Some(SurfaceErrorAction::Fatal) => {
                log::error!("surface out of memory, shutting down");
                false
            }
            _ => true,
        }
    }

    /// Releases the textures, the loader's surface, the renderer and the
    /// window, in that order. Safe to call at any point and more than once.
    pub fn teardown(&mut self) {
        if self.texture.take().is_some() {
            log::debug!("released active texture");
        }
        self.sprites.release();
        self.loader.release();
        self.renderer = TextureRenderer::new();
        self.viewports = None;

        if self.entry.take().is_some() {
            log::info!("window closed");
        }
    }

    #[inline]
    pub fn input(&self) -> &InputPoller {
        &self.input
    }

    #[inline]
    pub fn viewports(&self) -> Option<Viewports> {
        self.viewports
    }

    /// Sprite sheet loaded at startup, with its clips cut.
    #[inline]
    pub fn sprite_sheet(&self) -> &SpriteTexture<GpuTexture> {
        &self.sprites
    }

    #[inline]
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.entry.is_some()
    }

    fn request_redraw(&self) {
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn load_startup_assets(&mut self) {
        let default_image = self.config.default_image.clone();
        if !self.load_media(&default_image) {
            log::warn!("continuing without {}", default_image.display());
        }

        if let Some(sheet) = self.config.sprite_sheet.clone() {
            if !self.load_sprite_sheet(&sheet) {
                log::warn!("continuing without sprite sheet {}", sheet.display());
            }
        }
    }
}

impl Drop for GameCore {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl ApplicationHandler for GameCore {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        if !self.init(event_loop) {
            event_loop.exit();
            return;
        }

        self.load_startup_assets();
        self.request_redraw();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(ev) = translate_window_event(&event) {
            self.input.handle_event(&ev);
            if is_escape_press(&ev) {
                log::info!("escape pressed, closing");
                event_loop.exit();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if !self.render_viewports() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

fn render_ctx<'a>(gpu: &'a Gpu<'_>) -> RenderCtx<'a> {
    let size = gpu.size();
    RenderCtx::new(
        gpu.device(),
        gpu.queue(),
        gpu.surface_format(),
        Viewport::new(size.width, size.height),
    )
}

fn is_escape_press(ev: &InputEvent) -> bool {
    matches!(
        ev,
        InputEvent::Key { key: Key::Escape, state: KeyState::Pressed, .. }
    )
}

/// Builds the draws for one frame: `texture` stretched into each viewport.
/// Without a texture the frame is clear + present only.
fn build_frame_batch<'t, T>(texture: Option<&'t T>, viewports: &Viewports) -> SpriteBatch<'t, T> {
    let mut batch = SpriteBatch::new();

    if let Some(texture) = texture {
        for dst in viewports.iter() {
            batch.push(texture, dst, None);
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;
    use crate::coords::Rect;
    use crate::texture::testing::{write_fixture, MemoryBackend, MemoryTexture};

    fn viewports() -> Viewports {
        Viewports::split(640, 480)
    }

    #[test]
    fn default_config_is_640x480_black() {
        let c = RuntimeConfig::default();
        assert_eq!(c.title, "Nihilator");
        assert_eq!((c.width, c.height), (640, 480));
        assert_eq!(c.clear_color, Color::BLACK);
        assert!(c.sprite_sheet.is_none());
    }

    // ── frame batch ───────────────────────────────────────────────────────

    #[test]
    fn nothing_loaded_means_no_draws() {
        let batch = build_frame_batch::<MemoryTexture>(None, &viewports());
        assert!(batch.is_empty());
    }

    #[test]
    fn texture_fills_each_viewport() {
        let texture = MemoryTexture { width: 8, height: 8, rgba: vec![[0; 4]; 64] };

        let batch = build_frame_batch(Some(&texture), &viewports());
        let dsts: Vec<Rect> = batch.draws().iter().map(|d| d.dst).collect();
        assert_eq!(
            dsts,
            vec![
                Rect::new(0, 0, 320, 240),
                Rect::new(320, 0, 320, 240),
                Rect::new(0, 240, 640, 240),
            ]
        );
        assert!(batch.draws().iter().all(|d| d.src.is_none()));
    }

    fn loaded_sheet(dir: &tempfile::TempDir, backend: &MemoryBackend) -> SpriteTexture<MemoryTexture> {
        let path = write_fixture(dir.path(), "dots.png", ImageFormat::Png, 200, 200);
        let mut sprites = SpriteTexture::new();
        assert!(sprites.load_from_file(backend, &path));
        sprites.define_clips(SPRITE_CLIPS, SPRITE_CLIP_SIZE, SPRITE_CLIP_SIZE);
        sprites
    }

    #[test]
    fn loaded_sheet_without_texture_draws_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MemoryBackend::default();
        let sprites = loaded_sheet(&dir, &backend);
        assert!(sprites.is_loaded());
        assert_eq!(sprites.clips().len(), 4);

        let batch = build_frame_batch::<MemoryTexture>(None, &viewports());
        assert!(batch.is_empty());
    }

    #[test]
    fn loaded_sheet_leaves_texture_frame_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MemoryBackend::default();
        let sprites = loaded_sheet(&dir, &backend);

        let texture = MemoryTexture { width: 1, height: 1, rgba: vec![[0; 4]] };
        let batch = build_frame_batch(Some(&texture), &viewports());
        assert_eq!(batch.len(), 3);
        assert!(batch.draws().iter().all(|d| std::ptr::eq(d.texture, &texture)));

        let sheet = sprites.texture().unwrap();
        assert!(batch.draws().iter().all(|d| !std::ptr::eq(d.texture, sheet)));
    }

    // ── lifecycle without a window ────────────────────────────────────────

    #[test]
    fn teardown_before_init_is_harmless() {
        let mut core = GameCore::new(RuntimeConfig::default(), GpuInit::default());
        core.teardown();
        core.teardown();
        assert!(!core.is_initialized());
        assert!(core.viewports().is_none());
    }

    #[test]
    fn load_media_without_renderer_fails() {
        let mut core = GameCore::new(RuntimeConfig::default(), GpuInit::default());
        assert!(!core.load_media("images/default.bmp"));
        assert!(!core.has_texture());
        assert!(!core.load_sprite_sheet("images/sprites.png"));
        assert!(!core.sprite_sheet().is_loaded());
    }

    #[test]
    fn render_without_window_keeps_running() {
        let mut core = GameCore::new(RuntimeConfig::default(), GpuInit::default());
        assert!(core.render_viewports());
        assert!(!core.input().is_pressed(Key::W));
    }

    #[test]
    fn escape_press_detected() {
        let press = InputEvent::Key { key: Key::Escape, state: KeyState::Pressed, code: 1, repeat: false };
        let release = InputEvent::Key { key: Key::Escape, state: KeyState::Released, code: 1, repeat: false };
        assert!(is_escape_press(&press));
        assert!(!is_escape_press(&release));
        assert!(!is_escape_press(&InputEvent::Focused(false)));
    }
}
