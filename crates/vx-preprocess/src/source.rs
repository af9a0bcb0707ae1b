//! Shader source container
//!
//! Holds the final vertex/fragment text plus the paths they came from. The
//! paths only feed diagnostics; nothing re-reads them after construction.

use std::path::{Path, PathBuf};

use crate::error::PreprocessError;
use crate::splitter::Preprocessor;
use crate::ShaderStage;

/// Vertex and fragment source ready for compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    vertex_source: String,
    fragment_source: String,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderSource {
    /// Split one combined file with the default preprocessor
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Preprocessor::default().source_from_file(path)
    }

    /// Take the vertex stage of one file and the fragment stage of another,
    /// using the default preprocessor
    pub fn from_files(vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Self {
        Preprocessor::default().source_from_files(vertex_path, fragment_path)
    }

    /// Pre-built sources sharing one diagnostic path
    pub fn from_sources(
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let path = path.into();
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            vertex_path: path.clone(),
            fragment_path: path,
        }
    }

    /// Pre-built sources with a diagnostic path per stage
    pub fn from_sources_with_paths(
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }

    /// True when both stages are empty, e.g. after a failed split
    pub fn is_empty(&self) -> bool {
        self.vertex_source.is_empty() && self.fragment_source.is_empty()
    }
}

impl Preprocessor {
    /// Split a combined file starting outside any stage
    ///
    /// On failure the error is logged and the sources are left empty.
    pub fn source_from_file(&self, path: impl AsRef<Path>) -> ShaderSource {
        let path = path.as_ref();
        self.load_source(path).unwrap_or_else(|_| {
            ShaderSource::from_sources(String::new(), String::new(), path)
        })
    }

    /// Strict form of [`Preprocessor::source_from_file`]
    pub fn load_source(&self, path: impl AsRef<Path>) -> Result<ShaderSource, PreprocessError> {
        let path = path.as_ref();
        let split = self.split(path, ShaderStage::None)?;
        Ok(ShaderSource::from_sources(split.vertex, split.fragment, path))
    }

    /// Vertex stage from `vertex_path` (split starting in vertex) and fragment
    /// stage from `fragment_path` (split starting in fragment)
    ///
    /// A stage whose file fails to split is left empty; the other is kept.
    pub fn source_from_files(
        &self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> ShaderSource {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let vertex = self
            .split(vertex_path, ShaderStage::Vertex)
            .map(|split| split.vertex)
            .unwrap_or_default();
        let fragment = self
            .split(fragment_path, ShaderStage::Fragment)
            .map(|split| split.fragment)
            .unwrap_or_default();
        ShaderSource::from_sources_with_paths(vertex, fragment, vertex_path, fragment_path)
    }

    /// Strict form of [`Preprocessor::source_from_files`]
    pub fn load_source_pair(
        &self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<ShaderSource, PreprocessError> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let vertex = self.split(vertex_path, ShaderStage::Vertex)?.vertex;
        let fragment = self.split(fragment_path, ShaderStage::Fragment)?.fragment;
        Ok(ShaderSource::from_sources_with_paths(vertex, fragment, vertex_path, fragment_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildTarget;
    use std::fs;
    use tempfile::TempDir;

    fn native() -> Preprocessor {
        Preprocessor::for_target(BuildTarget::Native)
    }

    #[test]
    fn test_from_sources_shares_path() {
        let source = ShaderSource::from_sources("void main() {}", "out vec4 c;", "inline.glsl");
        assert_eq!(source.vertex_source(), "void main() {}");
        assert_eq!(source.fragment_source(), "out vec4 c;");
        assert_eq!(source.vertex_path(), Path::new("inline.glsl"));
        assert_eq!(source.fragment_path(), Path::new("inline.glsl"));
    }

    #[test]
    fn test_from_sources_with_paths_keeps_both() {
        let source = ShaderSource::from_sources_with_paths("v", "f", "a.vert", "b.frag");
        assert_eq!(source.vertex_path(), Path::new("a.vert"));
        assert_eq!(source.fragment_path(), Path::new("b.frag"));
        assert!(!source.is_empty());
    }

    #[test]
    fn test_source_from_combined_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.glsl");
        fs::write(&path, "$vertex\nv();\n$fragment\nf();\n").unwrap();

        let source = native().source_from_file(&path);
        assert_eq!(source.vertex_source(), "v();\n");
        assert_eq!(source.fragment_source(), "f();\n");
        assert_eq!(source.vertex_path(), path.as_path());
        assert_eq!(source.fragment_path(), path.as_path());
    }

    #[test]
    fn test_source_from_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.glsl");

        let source = native().source_from_file(&path);
        assert!(source.is_empty());
        assert_eq!(source.vertex_path(), path.as_path());
        assert!(native().load_source(&path).is_err());
    }

    #[test]
    fn test_source_from_two_files() {
        let dir = TempDir::new().unwrap();
        let vertex_path = dir.path().join("quad.vert.glsl");
        let fragment_path = dir.path().join("quad.frag.glsl");
        // Each file may still carry the other stage; only the matching one is kept
        fs::write(&vertex_path, "v();\n$fragment\nstray();\n").unwrap();
        fs::write(&fragment_path, "f();\n$vertex\nstray();\n").unwrap();

        let source = native().source_from_files(&vertex_path, &fragment_path);
        assert_eq!(source.vertex_source(), "v();\n");
        assert_eq!(source.fragment_source(), "f();\n");
        assert_eq!(source.vertex_path(), vertex_path.as_path());
        assert_eq!(source.fragment_path(), fragment_path.as_path());
    }

    #[test]
    fn test_source_pair_with_missing_fragment() {
        let dir = TempDir::new().unwrap();
        let vertex_path = dir.path().join("ok.glsl");
        fs::write(&vertex_path, "v();\n").unwrap();
        let fragment_path = dir.path().join("gone.glsl");

        let source = native().source_from_files(&vertex_path, &fragment_path);
        assert_eq!(source.vertex_source(), "v();\n");
        assert_eq!(source.fragment_source(), "");

        let err = native().load_source_pair(&vertex_path, &fragment_path).unwrap_err();
        assert_eq!(err.path(), fragment_path.as_path());
    }
}
