use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::gpu::SLOT_COUNT;
use crate::gpu::preview::SIZE_HINT;
use crate::processing::layout::ScaleMode;
use crate::processing::resample::ResampleFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Layer Preview".to_string(),
            width: SIZE_HINT.0,
            height: SIZE_HINT.1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LabelConfig {
    pub image: Option<PathBuf>,
    pub scale_mode: ScaleMode,
    pub filter: ResampleFilter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Draw layers immediately after startup.
    pub enabled: bool,
    pub msaa_samples: u32,
    /// Directory holding `quad.vert.wgsl` and `quad.frag.wgsl`; the built-in
    /// shaders are used when unset.
    pub shader_dir: Option<PathBuf>,
    /// One optional image per slot, in slot order.
    pub layers: Vec<Option<PathBuf>>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            msaa_samples: 1,
            shader_dir: None,
            layers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub window: WindowConfig,
    pub label: LabelConfig,
    pub preview: PreviewConfig,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Loads `path`, falling back to defaults when `path` is the default
    /// location and does not exist.
    pub fn load(path: &Path, is_default_path: bool) -> Result<Self> {
        if is_default_path && !path.exists() {
            return Ok(Self::default());
        }
        Self::from_yaml_file(path).with_context(|| format!("loading config from {}", path.display()))
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window width and height must be greater than zero"
        );
        ensure!(
            matches!(self.preview.msaa_samples, 1 | 4),
            "preview.msaa-samples must be 1 or 4 (got {})",
            self.preview.msaa_samples
        );
        ensure!(
            self.preview.layers.len() <= SLOT_COUNT,
            "preview.layers lists {} entries but only {} slots exist",
            self.preview.layers.len(),
            SLOT_COUNT
        );
        Ok(self)
    }

    /// Checks that the label window has an image to show.
    pub fn require_label_image(&self) -> Result<&Path> {
        self.label
            .image
            .as_deref()
            .context("label mode requires label.image or --image")
    }
}
