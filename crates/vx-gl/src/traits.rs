//! Graphics API trait abstraction
//!
//! The program builder only needs a narrow slice of the native API: shader
//! and program object lifetime, compile/link, status and info-log queries.
//! Keeping it behind a trait lets the builder run against [`crate::MockGl`]
//! without a GPU context.

use std::fmt;

/// Shader object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "Vertex",
            ShaderKind::Fragment => "Fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native shader/program object capability
///
/// Implementors must be used from the thread that owns the current context.
/// Creation calls return `Err` with the driver's message when no object could
/// be allocated; every other call mirrors the native entry point directly.
pub trait GlApi {
    /// Shader object handle
    type Shader: Copy + fmt::Debug;
    /// Program object handle
    type Program: Copy + fmt::Debug;
    /// Uniform location handle
    type UniformLocation: fmt::Debug;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Make `program` current for subsequent draws (`None` unbinds)
    fn use_program(&self, program: Option<Self::Program>);

    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    /// Program identifier as shown in diagnostics
    fn program_id(&self, program: Self::Program) -> String {
        format!("{program:?}")
    }
}
