use std::sync::Arc;

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{debug, error, info, warn};
use wgpu::{self, SurfaceError};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalSize, Size},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::config::Configuration;
use crate::gpu::preview::MINIMUM_SIZE_HINT;
use crate::gpu::shaders::DirectoryShaders;
use crate::gpu::texture::upload_rgba;
use crate::gpu::{
    GpuContext, LayerPreview, LayerSlot, PreviewFrame, PreviewState, PreviewSurface,
    TextureRegistry,
};
use crate::gpu_check;
use crate::processing::decode::decode_rgba8;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.05,
    a: 1.0,
};

/// Multisampled color target the preview renders into before resolving to
/// the swapchain.
struct MsaaTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct ViewerApp {
    cfg: Configuration,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    sample_count: u32,
    msaa: Option<MsaaTarget>,
    textures: TextureRegistry,
    // keeps the registered views' textures alive
    layer_textures: Vec<wgpu::Texture>,
    pending_layers: Vec<(LayerSlot, RgbaImage)>,
    preview: LayerPreview,
    pending_redraw: bool,
}

impl ViewerApp {
    fn new(cfg: Configuration, pending_layers: Vec<(LayerSlot, RgbaImage)>) -> Self {
        let preview = match cfg.preview.shader_dir.as_ref() {
            Some(dir) => LayerPreview::with_shaders(Box::new(DirectoryShaders::new(dir))),
            None => LayerPreview::new(),
        };
        Self {
            sample_count: cfg.preview.msaa_samples,
            cfg,
            window: None,
            surface: None,
            surface_config: None,
            device: None,
            queue: None,
            msaa: None,
            textures: TextureRegistry::new(),
            layer_textures: Vec::new(),
            pending_layers,
            preview,
            pending_redraw: false,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let (min_w, min_h) = MINIMUM_SIZE_HINT;
        let attrs = WindowAttributes::default()
            .with_title(self.cfg.window.title.clone())
            .with_inner_size(Size::Physical(PhysicalSize::new(
                self.cfg.window.width,
                self.cfg.window.height,
            )))
            .with_min_inner_size(Size::Physical(PhysicalSize::new(min_w, min_h)));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create preview window");
                None
            }
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        if self.sample_count > 1 {
            let flags = adapter.get_texture_format_features(format).flags;
            if !flags.sample_count_supported(self.sample_count) {
                warn!(
                    samples = self.sample_count,
                    format = ?format,
                    "multisampling not supported for surface format; using 1 sample"
                );
                self.sample_count = 1;
            }
        }

        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("preview-device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            samples = self.sample_count,
            "preview surface configured",
        );

        for (layer, image) in std::mem::take(&mut self.pending_layers) {
            let texture = upload_rgba(&device, &queue, &image, layer.as_str());
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let handle = self.textures.insert(view);
            self.layer_textures.push(texture);
            self.preview.set_layer(layer, Some(handle));
            debug!(layer = layer.as_str(), handle = handle.get(), "layer texture uploaded");
        }

        self.preview.initialize(&GpuContext {
            device: &device,
            queue: &queue,
            target_format: format,
            sample_count: self.sample_count,
        });
        if self.preview.state() == PreviewState::Degraded {
            warn!("layer preview running without a pipeline; only the background is shown");
        }
        self.preview.resize(config.width, config.height);
        self.preview.set_enabled(self.cfg.preview.enabled);

        self.msaa = create_msaa_target(&device, &config, self.sample_count);
        self.surface = Some(surface);
        self.surface_config = Some(config);
        self.device = Some(device);
        self.queue = Some(queue);
        self.pending_redraw = true;
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(surface), Some(device), Some(config)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.surface_config.as_mut(),
        ) else {
            return;
        };

        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(device, config);
        self.msaa = create_msaa_target(device, config, self.sample_count);
        self.preview.resize(config.width, config.height);
        debug!(
            width = config.width,
            height = config.height,
            "preview surface resized",
        );

        self.request_redraw();
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(surface), Some(device), Some(queue), Some(config), Some(window)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.queue.as_ref(),
            self.surface_config.as_ref(),
            self.window.clone(),
        ) else {
            return;
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("preview surface lost; reconfiguring");
                self.handle_resize(window.inner_size());
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("preview surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("preview surface acquisition timed out");
                return;
            }
            Err(SurfaceError::Other) => {
                warn!("preview surface reported an unknown error; retrying");
                self.handle_resize(window.inner_size());
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = match self.msaa.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("preview-encoder"),
        });

        self.pending_redraw = false;

        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("preview-clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        let draws = self.preview.draw(&mut PreviewFrame {
            device,
            encoder: &mut encoder,
            target,
            target_size: (config.width, config.height),
            resolve_target,
            textures: &self.textures,
        });
        debug!(draws, "preview frame recorded");

        gpu_check!(device, queue.submit(std::iter::once(encoder.finish())));
        frame.present();

        if self.preview.take_redraw_request() {
            self.pending_redraw = true;
        }
    }

    fn request_redraw(&mut self) {
        self.pending_redraw = true;
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self) {
        self.preview.teardown();
        for texture in self.layer_textures.drain(..) {
            texture.destroy();
        }
        self.msaa = None;
    }
}

fn create_msaa_target(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<MsaaTarget> {
    if sample_count <= 1 {
        return None;
    }
    let texture = gpu_check!(
        device,
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("preview-msaa"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    );
    let view = gpu_check!(
        device,
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    );
    Some(MsaaTarget {
        _texture: texture,
        view,
    })
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.device.is_none() {
            if let Err(err) = self.init_gpu(window) {
                error!(error = ?err, "failed to initialize GPU state");
                event_loop.exit();
                return;
            }
        }

        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("preview window close requested");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let size = window.inner_size();
                let _ = inner_size_writer.request_inner_size(size);
                self.handle_resize(size);
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.pending_redraw {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Decodes the configured layer images and runs the preview window until it
/// is closed.
pub fn run_windowed(cfg: Configuration) -> Result<()> {
    let mut layers = Vec::new();
    for (index, path) in cfg.preview.layers.iter().enumerate() {
        let Some(path) = path else {
            continue;
        };
        let layer = LayerSlot::from_index(index)
            .with_context(|| format!("no layer slot for index {index}"))?;
        let image = decode_rgba8(path)
            .with_context(|| format!("loading {} layer {}", layer.as_str(), path.display()))?;
        layers.push((layer, image));
    }
    info!(layers = layers.len(), "layer images decoded");

    let event_loop = EventLoop::new().context("failed to build preview event loop")?;
    let mut app = ViewerApp::new(cfg, layers);
    event_loop.run_app(&mut app).context("preview event loop failed")
}
