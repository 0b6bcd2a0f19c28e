use std::path::PathBuf;

use thiserror::Error;

/// Library error type for the label and compositor components.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// A slot index past the compositor's fixed slot count.
    #[error("texture slot {slot} is out of range (slot count is {count})")]
    SlotOutOfRange { slot: usize, count: usize },

    /// A shader source file could not be read.
    #[error("failed to read shader source {path}")]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Shader compilation or pipeline linking was rejected by the GPU backend.
    #[error("{stage} shader build failed: {log}")]
    ShaderBuild { stage: &'static str, log: String },

    /// The resampler rejected the source or target buffer.
    #[error("resample failed: {0}")]
    Resample(String),

    /// Image decoding error.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
