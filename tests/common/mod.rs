//! Common test utilities and harness
//!
//! Provides an isolated shader directory for end-to-end tests plus a few
//! assertion helpers for split output.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vx_preprocess::{BuildTarget, Preprocessor};

/// Temporary project directory holding shader files
pub struct ShaderFixture {
    /// Keeps the directory alive for the test's duration
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl ShaderFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write `content` to `name` under the root, creating parent directories
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create shader directory");
        }
        std::fs::write(&path, content).expect("Failed to write shader");
        path
    }

    /// Write `vxshader.toml` at the root
    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write(vx_config::CONFIG_FILE_NAME, content)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.root.join(name)).expect("Failed to read output")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }
}

impl Default for ShaderFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn native() -> Preprocessor {
    Preprocessor::for_target(BuildTarget::Native)
}

pub fn emscripten() -> Preprocessor {
    Preprocessor::for_target(BuildTarget::Emscripten)
}

/// Assert that `text` is exactly `lines`, each newline-terminated
pub fn assert_lines(text: &str, lines: &[&str]) {
    let expected: String = lines.iter().map(|line| format!("{line}\n")).collect();
    assert_eq!(text, expected, "unexpected stage text");
}

/// Path relative to the fixture root, for readable assertions
pub fn relative<'a>(fixture: &ShaderFixture, path: &'a Path) -> &'a Path {
    path.strip_prefix(&fixture.root).unwrap_or(path)
}
