use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;

use image::RgbaImage;

use crate::gpu_check;

/// Opaque, host-owned texture identity. The raw value `0` means "no texture".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(NonZeroU64);

impl TextureHandle {
    /// Wraps a raw handle; `0` yields `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side table of textures the compositor may sample.
///
/// Every insert issues a new handle, so a handle never refers to two
/// different textures over its lifetime.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    issued: u64,
    views: HashMap<TextureHandle, wgpu::TextureView>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view: wgpu::TextureView) -> TextureHandle {
        let handle = TextureHandle(NonZeroU64::MIN.saturating_add(self.issued));
        self.issued += 1;
        self.views.insert(handle, view);
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.views.get(&handle)
    }

    pub fn remove(&mut self, handle: TextureHandle) -> Option<wgpu::TextureView> {
        self.views.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Uploads an RGBA8 image into a new sampled texture.
pub fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &RgbaImage,
    label: &str,
) -> wgpu::Texture {
    let (w, h) = image.dimensions();
    let size = wgpu::Extent3d {
        width: w.max(1),
        height: h.max(1),
        depth_or_array_layers: 1,
    };
    let texture = gpu_check!(
        device,
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    );
    if w > 0 && h > 0 {
        gpu_check!(
            device,
            queue.write_texture(
                texture.as_image_copy(),
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                size,
            )
        );
    }
    texture
}
