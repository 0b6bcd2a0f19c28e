//! Layered texture preview: one quad per slot, composited side by side with
//! a single pass-through pipeline.

use std::ops::Range;

use tracing::{debug, error, info, trace, warn};
use wgpu::util::DeviceExt;

use crate::error::PreviewError;
use crate::gpu::check;
use crate::gpu::quad::{self, ScreenQuad};
use crate::gpu::shaders::{EmbeddedShaders, FRAGMENT_ENTRY, ShaderSource, VERTEX_ENTRY};
use crate::gpu::texture::{TextureHandle, TextureRegistry};
use crate::gpu_check;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Preferred and minimum widget sizes, in pixels.
pub const SIZE_HINT: (u32, u32) = (500, 120);
pub const MINIMUM_SIZE_HINT: (u32, u32) = (360, 120);

/// Texture layers shown by the bundled preview host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerSlot {
    Background,
    Foreground,
    Overlay,
}

impl LayerSlot {
    pub const COUNT: usize = 3;
    pub const ALL: [LayerSlot; Self::COUNT] = [Self::Background, Self::Foreground, Self::Overlay];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Foreground => "foreground",
            Self::Overlay => "overlay",
        }
    }
}

pub const SLOT_COUNT: usize = LayerSlot::COUNT;

/// Compositor with one slot per [`LayerSlot`].
pub type LayerPreview = LayeredQuadPreview<SLOT_COUNT>;

/// GPU context made current by the host before initialization.
pub struct GpuContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
    /// Sample count of the color target; 1 disables multisampling.
    pub sample_count: u32,
}

/// Everything a single `draw` call needs from the host.
pub struct PreviewFrame<'a> {
    pub device: &'a wgpu::Device,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Color target, left as-is apart from the quads drawn into it.
    pub target: &'a wgpu::TextureView,
    pub target_size: (u32, u32),
    /// Single-sample view to resolve into when the target is multisampled.
    pub resolve_target: Option<&'a wgpu::TextureView>,
    pub textures: &'a TextureRegistry,
}

/// Host-facing lifecycle of a draw surface.
pub trait PreviewSurface {
    /// Builds GPU resources; called once the host's GPU context is ready.
    fn initialize(&mut self, ctx: &GpuContext<'_>);
    fn resize(&mut self, width: u32, height: u32);
    /// Records this frame's draws and returns how many draw calls were issued.
    fn draw(&mut self, frame: &mut PreviewFrame<'_>) -> usize;
    /// Releases GPU resources; the surface stays inert afterwards.
    fn teardown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Uninitialized,
    Ready,
    /// Ready, but the shader build failed; draws are no-ops.
    Degraded,
    Disposed,
}

enum Lifecycle {
    Uninitialized,
    /// `None` when the pipeline could not be built.
    Ready(Option<QuadResources>),
    Disposed,
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

struct SlotBinding {
    handle: TextureHandle,
    bind_group: wgpu::BindGroup,
}

struct QuadResources {
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    positions: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    indices: wgpu::Buffer,
    sample_count: u32,
    depth: Option<DepthTarget>,
    bindings: Vec<Option<SlotBinding>>,
}

/// Composites up to `N` host-owned textures as side-by-side quads.
///
/// The compositor only stores [`TextureHandle`]s; the textures behind them
/// are resolved through the host's [`TextureRegistry`] at draw time and are
/// never created, mutated or destroyed here.
pub struct LayeredQuadPreview<const N: usize> {
    lifecycle: Lifecycle,
    shaders: Box<dyn ShaderSource>,
    slots: [Option<TextureHandle>; N],
    viewport: (u32, u32),
    aspect_ratio: f32,
    enabled: bool,
    redraw_requested: bool,
}

impl<const N: usize> Default for LayeredQuadPreview<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LayeredQuadPreview<N> {
    pub fn new() -> Self {
        Self::with_shaders(Box::new(EmbeddedShaders))
    }

    pub fn with_shaders(shaders: Box<dyn ShaderSource>) -> Self {
        const { assert!(N > 0, "a layered preview needs at least one slot") };
        Self {
            lifecycle: Lifecycle::Uninitialized,
            shaders,
            slots: [None; N],
            viewport: (1, 1),
            aspect_ratio: 1.0,
            enabled: false,
            redraw_requested: false,
        }
    }

    pub const fn slot_count(&self) -> usize {
        N
    }

    pub fn size_hint() -> (u32, u32) {
        SIZE_HINT
    }

    pub fn minimum_size_hint() -> (u32, u32) {
        MINIMUM_SIZE_HINT
    }

    pub fn state(&self) -> PreviewState {
        match &self.lifecycle {
            Lifecycle::Uninitialized => PreviewState::Uninitialized,
            Lifecycle::Ready(Some(_)) => PreviewState::Ready,
            Lifecycle::Ready(None) => PreviewState::Degraded,
            Lifecycle::Disposed => PreviewState::Disposed,
        }
    }

    /// Replaces the handle stored for `slot` and requests a redraw.
    ///
    /// The handle is not checked against the registry; unknown handles are
    /// skipped at draw time.
    pub fn set_texture(
        &mut self,
        slot: usize,
        handle: Option<TextureHandle>,
    ) -> Result<(), PreviewError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(PreviewError::SlotOutOfRange { slot, count: N })?;
        *entry = handle;
        debug!(slot, handle = handle.map(TextureHandle::get), "texture slot updated");
        self.redraw_requested = true;
        Ok(())
    }

    pub fn texture(&self, slot: usize) -> Option<TextureHandle> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.redraw_requested = true;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Width over height of the last viewport.
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Slots `draw` will issue calls for, in draw order, with their index
    /// ranges.
    pub fn draw_plan(&self) -> impl Iterator<Item = (usize, Range<u32>)> + '_ {
        occupied_slots(&self.slots).map(|(slot, _, range)| (slot, range))
    }
}

impl LayeredQuadPreview<SLOT_COUNT> {
    pub fn set_layer(&mut self, layer: LayerSlot, handle: Option<TextureHandle>) {
        self.slots[layer.index()] = handle;
        debug!(
            layer = layer.as_str(),
            handle = handle.map(TextureHandle::get),
            "texture layer updated"
        );
        self.redraw_requested = true;
    }
}

fn occupied_slots(
    slots: &[Option<TextureHandle>],
) -> impl Iterator<Item = (usize, TextureHandle, Range<u32>)> + '_ {
    slots
        .iter()
        .enumerate()
        .filter_map(|(slot, handle)| handle.map(|handle| (slot, handle, quad::index_range(slot))))
}

impl<const N: usize> PreviewSurface for LayeredQuadPreview<N> {
    fn initialize(&mut self, ctx: &GpuContext<'_>) {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Ready(_) => {
                warn!("layer preview already initialized; ignoring");
                return;
            }
            Lifecycle::Disposed => {
                warn!("layer preview was torn down; ignoring initialize");
                return;
            }
        }

        let resources = match QuadResources::build(ctx, self.shaders.as_ref(), N) {
            Ok(resources) => {
                info!(
                    slots = N,
                    sample_count = ctx.sample_count,
                    format = ?ctx.target_format,
                    "layer preview ready"
                );
                Some(resources)
            }
            Err(err) => {
                error!(error = %err, "layer preview shader build failed; drawing disabled");
                None
            }
        };
        self.lifecycle = Lifecycle::Ready(resources);
        self.redraw_requested = true;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.aspect_ratio = width as f32 / height.max(1) as f32;
        debug!(width, height, aspect = self.aspect_ratio, "layer preview resized");
    }

    fn draw(&mut self, frame: &mut PreviewFrame<'_>) -> usize {
        if !self.enabled {
            return 0;
        }
        let Lifecycle::Ready(Some(resources)) = &mut self.lifecycle else {
            return 0;
        };
        let (target_w, target_h) = frame.target_size;
        let viewport_w = self.viewport.0.min(target_w);
        let viewport_h = self.viewport.1.min(target_h);
        if viewport_w == 0 || viewport_h == 0 {
            return 0;
        }

        resources.ensure_depth(frame.device, target_w, target_h);
        for (slot, handle, _) in occupied_slots(&self.slots) {
            resources.ensure_binding(frame.device, slot, handle, frame.textures);
        }
        let resources = &*resources;
        let Some(depth) = resources.depth.as_ref() else {
            return 0;
        };

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("layer-preview-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.target,
                resolve_target: frame.resolve_target,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_viewport(0.0, 0.0, viewport_w as f32, viewport_h as f32, 0.0, 1.0);
        pass.set_pipeline(&resources.pipeline);
        pass.set_vertex_buffer(0, resources.positions.slice(..));
        pass.set_vertex_buffer(1, resources.tex_coords.slice(..));
        pass.set_index_buffer(resources.indices.slice(..), wgpu::IndexFormat::Uint32);

        let mut draws = 0;
        for (slot, handle, range) in occupied_slots(&self.slots) {
            let Some(binding) = resources.bindings[slot]
                .as_ref()
                .filter(|binding| binding.handle == handle)
            else {
                continue;
            };
            pass.set_bind_group(0, &binding.bind_group, &[]);
            pass.draw_indexed(range, 0, 0..1);
            draws += 1;
        }
        drop(pass);

        trace!(draws, viewport_w, viewport_h, "layer preview drawn");
        draws
    }

    fn teardown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
            Lifecycle::Ready(resources) => {
                drop(resources);
                info!("layer preview disposed");
            }
            Lifecycle::Uninitialized => debug!("layer preview disposed before initialization"),
            Lifecycle::Disposed => {}
        }
    }
}

impl QuadResources {
    fn build(
        ctx: &GpuContext<'_>,
        shaders: &dyn ShaderSource,
        quads: usize,
    ) -> Result<Self, PreviewError> {
        let device = ctx.device;

        debug!("loading quad vertex shader");
        let vertex_src = shaders.vertex()?;
        let vertex = compile_stage(device, "vertex", &vertex_src)?;
        debug!("loading quad fragment shader");
        let fragment_src = shaders.fragment()?;
        let fragment = compile_stage(device, "fragment", &fragment_src)?;

        let bind_layout = gpu_check!(
            device,
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("layer-preview-bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
        );
        let pipeline_layout = gpu_check!(
            device,
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("layer-preview-pipeline-layout"),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            })
        );

        let (pipeline, link_error) = check::capture(device, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("layer-preview-pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &[quad::position_layout(), quad::tex_coord_layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                // depth is cleared each frame but never tested or written
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: ctx.sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        });
        if let Some(err) = link_error {
            return Err(PreviewError::ShaderBuild {
                stage: "pipeline",
                log: err.to_string(),
            });
        }

        let sampler = gpu_check!(
            device,
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("layer-preview-sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        );

        let geometry = ScreenQuad::new(quads);
        let positions = gpu_check!(
            device,
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("layer-preview-positions"),
                contents: bytemuck::cast_slice(&geometry.positions),
                usage: wgpu::BufferUsages::VERTEX,
            })
        );
        let tex_coords = gpu_check!(
            device,
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("layer-preview-tex-coords"),
                contents: bytemuck::cast_slice(&geometry.tex_coords),
                usage: wgpu::BufferUsages::VERTEX,
            })
        );
        let indices = gpu_check!(
            device,
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("layer-preview-indices"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        );

        Ok(Self {
            pipeline,
            bind_layout,
            sampler,
            positions,
            tex_coords,
            indices,
            sample_count: ctx.sample_count,
            depth: None,
            bindings: (0..quads).map(|_| None).collect(),
        })
    }

    fn ensure_depth(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self
            .depth
            .as_ref()
            .is_some_and(|depth| depth.size == (width, height))
        {
            return;
        }
        let texture = gpu_check!(
            device,
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("layer-preview-depth"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: self.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        );
        let view = gpu_check!(
            device,
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        );
        self.depth = Some(DepthTarget {
            _texture: texture,
            view,
            size: (width, height),
        });
    }

    fn ensure_binding(
        &mut self,
        device: &wgpu::Device,
        slot: usize,
        handle: TextureHandle,
        textures: &TextureRegistry,
    ) {
        let Some(cached) = self.bindings.get_mut(slot) else {
            return;
        };
        if cached.as_ref().is_some_and(|binding| binding.handle == handle) {
            return;
        }
        let Some(view) = textures.get(handle) else {
            debug!(slot, handle = handle.get(), "texture handle not registered; skipping slot");
            *cached = None;
            return;
        };
        let bind_group = gpu_check!(
            device,
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("layer-preview-slot"),
                layout: &self.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        );
        *cached = Some(SlotBinding { handle, bind_group });
    }
}

fn compile_stage(
    device: &wgpu::Device,
    stage: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, PreviewError> {
    let (module, caught) = check::capture(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(stage),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });
    match caught {
        Some(err) => Err(PreviewError::ShaderBuild {
            stage,
            log: err.to_string(),
        }),
        None => {
            debug!(stage, "shader compiled");
            Ok(module)
        }
    }
}
