//! GPU side of the preview: texture slots, screen geometry, shaders and the
//! layered compositor.

pub mod check;
pub mod preview;
pub mod quad;
pub mod shaders;
pub mod texture;

pub use preview::{
    GpuContext, LayerPreview, LayerSlot, LayeredQuadPreview, PreviewFrame, PreviewState,
    PreviewSurface, SLOT_COUNT,
};
pub use texture::{TextureHandle, TextureRegistry};
