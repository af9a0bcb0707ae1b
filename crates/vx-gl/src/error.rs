//! Program build errors

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use vx_preprocess::PreprocessError;

use crate::traits::ShaderKind;

/// One compile or link failure, with the native info log verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFailure {
    Compile {
        kind: ShaderKind,
        path: PathBuf,
        log: String,
    },
    Link {
        /// Native program identifier, as rendered by the backend
        program: String,
        vertex_path: PathBuf,
        fragment_path: PathBuf,
        log: String,
    },
}

impl BuildFailure {
    /// The native compiler/linker output
    pub fn log(&self) -> &str {
        match self {
            BuildFailure::Compile { log, .. } | BuildFailure::Link { log, .. } => log,
        }
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFailure::Compile { kind, path, log } => write!(
                f,
                "failed to compile {kind} shader \"{}\":\n\n{log}",
                path.display()
            ),
            BuildFailure::Link {
                program,
                vertex_path,
                fragment_path,
                log,
            } => write!(
                f,
                "failed to link shader program {program}:\n\
                 \tVertex Shader: \"{}\"\n\
                 \tFragment Shader: \"{}\"\n\n{log}",
                vertex_path.display(),
                fragment_path.display()
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Source(#[from] PreprocessError),

    #[error("failed to create GL object: {0}")]
    ObjectCreation(String),

    #[error("{}", render_failures(.0))]
    Failed(Vec<BuildFailure>),
}

impl BuildError {
    /// Compile/link failures carried by this error, if any
    pub fn failures(&self) -> &[BuildFailure] {
        match self {
            BuildError::Failed(failures) => failures,
            _ => &[],
        }
    }
}

fn render_failures(failures: &[BuildFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
