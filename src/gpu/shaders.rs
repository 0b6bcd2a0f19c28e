use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::PreviewError;

pub const VERTEX_SHADER_FILE: &str = "quad.vert.wgsl";
pub const FRAGMENT_SHADER_FILE: &str = "quad.frag.wgsl";
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Supplies the quad compositor's two WGSL stages.
pub trait ShaderSource {
    fn vertex(&self) -> Result<Cow<'_, str>, PreviewError>;
    fn fragment(&self) -> Result<Cow<'_, str>, PreviewError>;
}

/// Shaders compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedShaders;

impl ShaderSource for EmbeddedShaders {
    fn vertex(&self) -> Result<Cow<'_, str>, PreviewError> {
        Ok(Cow::Borrowed(include_str!("shaders/quad.vert.wgsl")))
    }

    fn fragment(&self) -> Result<Cow<'_, str>, PreviewError> {
        Ok(Cow::Borrowed(include_str!("shaders/quad.frag.wgsl")))
    }
}

/// Reads `quad.vert.wgsl` and `quad.frag.wgsl` from a directory at
/// initialization time.
#[derive(Debug, Clone)]
pub struct DirectoryShaders {
    dir: PathBuf,
}

impl DirectoryShaders {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, file: &str) -> Result<Cow<'_, str>, PreviewError> {
        let path = self.dir.join(file);
        std::fs::read_to_string(&path)
            .map(Cow::Owned)
            .map_err(|source| PreviewError::ShaderSource { path, source })
    }
}

impl ShaderSource for DirectoryShaders {
    fn vertex(&self) -> Result<Cow<'_, str>, PreviewError> {
        self.read(VERTEX_SHADER_FILE)
    }

    fn fragment(&self) -> Result<Cow<'_, str>, PreviewError> {
        self.read(FRAGMENT_SHADER_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_stages_expose_entry_points() {
        let shaders = EmbeddedShaders;
        let vertex = shaders.vertex().unwrap();
        let fragment = shaders.fragment().unwrap();
        assert!(vertex.contains(&format!("fn {VERTEX_ENTRY}(")));
        assert!(vertex.contains("@location(0) position"));
        assert!(vertex.contains("@location(1) tex_coord"));
        assert!(fragment.contains(&format!("fn {FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn directory_shaders_read_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERTEX_SHADER_FILE), "// vertex").unwrap();
        std::fs::write(dir.path().join(FRAGMENT_SHADER_FILE), "// fragment").unwrap();
        let shaders = DirectoryShaders::new(dir.path());
        assert_eq!(shaders.vertex().unwrap(), "// vertex");
        assert_eq!(shaders.fragment().unwrap(), "// fragment");
    }

    #[test]
    fn missing_directory_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryShaders::new(dir.path()).fragment().unwrap_err();
        match err {
            PreviewError::ShaderSource { path, .. } => {
                assert!(path.ends_with(FRAGMENT_SHADER_FILE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
