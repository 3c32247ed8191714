use std::path::Path;

use crate::error::{Error, Result};
use crate::imaging::PixelSurface;
use crate::render::RenderCtx;

/// Pixel dimensions of an uploaded texture.
pub trait TextureSize {
    fn size(&self) -> (u32, u32);
}

/// Turns CPU surfaces into textures the renderer can draw.
pub trait TextureBackend {
    type Texture: TextureSize;

    /// Uploads `surface`. `path` only labels diagnostics.
    fn upload(&self, path: &Path, surface: &PixelSurface) -> Result<Self::Texture>;
}

/// GPU-resident image. The view holds the texture; dropping it releases both.
#[derive(Debug)]
pub struct GpuTexture {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl TextureSize for GpuTexture {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl TextureBackend for RenderCtx<'_> {
    type Texture = GpuTexture;

    fn upload(&self, path: &Path, surface: &PixelSurface) -> Result<GpuTexture> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Err(Error::upload(path, "surface has zero size"));
        }

        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(Error::upload(
                path,
                format!("{width}x{height} exceeds the device limit of {max}"),
            ));
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nihilator image texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: surface.format().to_wgpu(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            surface.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(surface.pitch() as u32),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("uploaded {} as {width}x{height} {:?}", path.display(), surface.format());

        Ok(GpuTexture { view, width, height })
    }
}
