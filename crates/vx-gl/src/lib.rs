//! VX GL - shader compilation and program linking
//!
//! This crate provides:
//! - A graphics-API trait (`GlApi`) covering shader and program objects
//! - The program builder: compile both stages, link, report diagnostics
//! - A recording mock API for headless tests
//! - A glow-backed implementation (feature `glow`)

pub mod error;
pub mod mock;
pub mod program;
pub mod traits;

#[cfg(feature = "glow")]
pub mod glow_backend;

pub use error::{BuildError, BuildFailure};
pub use mock::{GlCall, MockGl};
pub use program::{BuildReport, Program, ProgramBuilder};
pub use traits::{GlApi, ShaderKind};

#[cfg(feature = "glow")]
pub use glow_backend::GlowApi;
