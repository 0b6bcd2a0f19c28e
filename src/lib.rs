pub mod config;
pub mod error;
pub mod gpu;
pub mod label;
pub mod processing {
    pub mod decode;
    pub mod layout;
    pub mod resample;
}
pub mod tasks {
    pub mod label_window;
    pub mod viewer;
}

pub use error::PreviewError;
pub use gpu::{LayerPreview, LayerSlot, LayeredQuadPreview, TextureHandle, TextureRegistry};
pub use label::ImageFitLabel;
