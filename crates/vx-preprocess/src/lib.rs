//! VX Preprocess - annotated shader source splitting
//!
//! This crate provides:
//! - Line classification and `$` directive parsing
//! - Stage/platform gated splitting of one file into vertex and fragment text
//! - Recursive `$include` resolution relative to the including file
//! - The `ShaderSource` container handed to the program builder

pub mod directive;
pub mod error;
pub mod line;
pub mod source;
pub mod splitter;

pub use directive::{Directive, DirectiveMatching};
pub use error::{Diagnostic, IncludeFailure, PreprocessError};
pub use line::{LineKind, classify};
pub use source::ShaderSource;
pub use splitter::{PreprocessOptions, Preprocessor, Split};

use serde::{Deserialize, Serialize};

/// Log target shared by every shader diagnostic
pub const LOG_TARGET: &str = "opengl";

/// Which half of a program the current region belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderStage {
    /// Region is excluded from both outputs
    #[default]
    None,
    Vertex,
    Fragment,
}

/// Conditional-compilation gate opened by `$native` / `$emscripten`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlatformGate {
    #[default]
    Indifferent,
    Native,
    Emscripten,
}

/// The platform a shader is being assembled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    Native,
    Emscripten,
}

impl BuildTarget {
    /// The target this crate was compiled for
    pub const fn host() -> Self {
        if cfg!(any(target_os = "emscripten", target_arch = "wasm32")) {
            BuildTarget::Emscripten
        } else {
            BuildTarget::Native
        }
    }

    /// Whether content under `gate` is written for this target
    pub fn admits(self, gate: PlatformGate) -> bool {
        match gate {
            PlatformGate::Indifferent => true,
            PlatformGate::Native => self == BuildTarget::Native,
            PlatformGate::Emscripten => self == BuildTarget::Emscripten,
        }
    }
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self::host()
    }
}

impl std::str::FromStr for BuildTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(BuildTarget::Native),
            "emscripten" | "web" => Ok(BuildTarget::Emscripten),
            other => Err(format!("unknown build target: {other}")),
        }
    }
}

/// Write gate predicate, evaluated for every content line and include splice
pub fn can_write(stage: ShaderStage, gate: PlatformGate, target: BuildTarget) -> bool {
    stage != ShaderStage::None && target.admits(gate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_stage_never_writes() {
        for gate in [PlatformGate::Indifferent, PlatformGate::Native, PlatformGate::Emscripten] {
            assert!(!can_write(ShaderStage::None, gate, BuildTarget::Native));
            assert!(!can_write(ShaderStage::None, gate, BuildTarget::Emscripten));
        }
    }

    #[test]
    fn test_native_target_gates() {
        let t = BuildTarget::Native;
        assert!(can_write(ShaderStage::Vertex, PlatformGate::Indifferent, t));
        assert!(can_write(ShaderStage::Fragment, PlatformGate::Native, t));
        assert!(!can_write(ShaderStage::Vertex, PlatformGate::Emscripten, t));
    }

    #[test]
    fn test_emscripten_target_gates() {
        let t = BuildTarget::Emscripten;
        assert!(can_write(ShaderStage::Vertex, PlatformGate::Indifferent, t));
        assert!(!can_write(ShaderStage::Vertex, PlatformGate::Native, t));
        assert!(can_write(ShaderStage::Fragment, PlatformGate::Emscripten, t));
    }

    #[test]
    fn test_build_target_from_str() {
        assert_eq!("native".parse::<BuildTarget>(), Ok(BuildTarget::Native));
        assert_eq!("Emscripten".parse::<BuildTarget>(), Ok(BuildTarget::Emscripten));
        assert!("metal".parse::<BuildTarget>().is_err());
    }
}
