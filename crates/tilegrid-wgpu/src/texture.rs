//! Atlas page textures backed by wgpu.

use std::sync::Arc;

use tilegrid_atlas::{GpuCaps, Texture, TextureFactory};
use tilegrid_core::{Bitmap, Color, Rect, Size};

/// Read the texture limits once, right after the device is created.
///
/// Every wgpu backend samples non-power-of-two textures, so `npot` is
/// always set.
pub fn probe_caps(device: &wgpu::Device) -> GpuCaps {
    let caps = GpuCaps {
        max_texture_size: device.limits().max_texture_dimension_2d,
        npot: true,
    };
    log::debug!("texture limit {}px", caps.max_texture_size);
    caps
}

/// Creates one [`WgpuTexture`] per atlas page.
#[derive(Clone)]
pub struct WgpuTextures {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl WgpuTextures {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }
}

impl TextureFactory for WgpuTextures {
    type Texture = WgpuTexture;

    fn create_texture(&mut self) -> WgpuTexture {
        WgpuTexture {
            device: Arc::clone(&self.device),
            queue: Arc::clone(&self.queue),
            texture: None,
            view: None,
            size: Size::default(),
        }
    }
}

/// An `Rgba8Unorm` texture mirroring one page canvas.
///
/// Nothing is allocated until the first full upload; a full upload at a new
/// size replaces the texture.
pub struct WgpuTexture {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    size: Size,
}

impl WgpuTexture {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.texture.as_ref()
    }

    /// View for a bind group; `None` before the first upload.
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }

    fn extent(size: Size) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: size.width as u32,
            height: size.height as u32,
            depth_or_array_layers: 1,
        }
    }

    fn write(&self, texture: &wgpu::Texture, area: Rect, pixels: &[Color]) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: area.left as u32,
                    y: area.top as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(area.width as u32 * 4),
                rows_per_image: Some(area.height as u32),
            },
            Self::extent(area.size()),
        );
    }
}

impl Texture for WgpuTexture {
    fn upload(&mut self, bitmap: &Bitmap) {
        let size = bitmap.size();
        if size.is_empty() {
            return;
        }
        if self.texture.is_none() || self.size != size {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("tilegrid page"),
                size: Self::extent(size),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.texture = Some(texture);
            self.size = size;
            log::debug!("page texture allocated at {size}");
        }
        if let Some(texture) = &self.texture {
            self.write(texture, Rect::from_size(size), bitmap.pixels());
        }
    }

    fn update(&mut self, area: Rect, pixels: &[Color]) {
        let Some(texture) = &self.texture else {
            log::warn!("partial update of {area} before the first upload");
            return;
        };
        if area.is_empty() {
            return;
        }
        self.write(texture, area, pixels);
    }
}
