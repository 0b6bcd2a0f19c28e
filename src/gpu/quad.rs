//! Static screen geometry: one unit quad per texture slot, tiled left to
//! right across normalized device coordinates.

use std::ops::Range;

/// Vertex attribute location of the `position` input.
pub const POSITION_ATTRIBUTE: u32 = 0;
/// Vertex attribute location of the `tex_coord` input.
pub const TEX_COORD_ATTRIBUTE: u32 = 1;

pub const VERTICES_PER_QUAD: u32 = 4;
/// Two triangles.
pub const INDICES_PER_QUAD: u32 = 6;

// Same rectangle for every quad; v = 0 is the bottom edge.
const FULL_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// CPU-side copy of the compositor geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenQuad {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ScreenQuad {
    /// Builds `quads` side-by-side boxes, each `2 / quads` wide and spanning
    /// the full height.
    pub fn new(quads: usize) -> Self {
        let quads = quads.max(1);
        let box_w = 2.0 / quads as f32;
        let mut positions = Vec::with_capacity(quads * VERTICES_PER_QUAD as usize);
        let mut tex_coords = Vec::with_capacity(quads * VERTICES_PER_QUAD as usize);
        let mut indices = Vec::with_capacity(quads * INDICES_PER_QUAD as usize);

        for t in 0..quads {
            let left = -1.0 + t as f32 * box_w;
            let right = -1.0 + (t + 1) as f32 * box_w;
            positions.extend_from_slice(&[
                [left, -1.0, 0.0],
                [right, -1.0, 0.0],
                [right, 1.0, 0.0],
                [left, 1.0, 0.0],
            ]);
            tex_coords.extend_from_slice(&FULL_TEX_COORDS);

            let o = t as u32 * VERTICES_PER_QUAD;
            // bottom-left, bottom-right, top-right / bottom-left, top-right, top-left
            indices.extend_from_slice(&[o, o + 1, o + 2, o, o + 2, o + 3]);
        }

        Self {
            positions,
            tex_coords,
            indices,
        }
    }

    pub fn quad_count(&self) -> usize {
        self.positions.len() / VERTICES_PER_QUAD as usize
    }
}

/// Index-buffer range drawn for `slot`.
pub fn index_range(slot: usize) -> Range<u32> {
    let start = slot as u32 * INDICES_PER_QUAD;
    start..start + INDICES_PER_QUAD
}

/// Byte offset of `slot`'s first index in a `u32` index buffer.
pub fn index_byte_offset(slot: usize) -> u64 {
    u64::from(index_range(slot).start) * std::mem::size_of::<u32>() as u64
}

pub(crate) fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: POSITION_ATTRIBUTE,
        }],
    }
}

pub(crate) fn tex_coord_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: TEX_COORD_ATTRIBUTE,
        }],
    }
}
