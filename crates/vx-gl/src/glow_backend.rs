//! glow-backed [`GlApi`]
//!
//! Works on desktop GL and, through glow's web context, on wasm targets.

use glow::HasContext;

use crate::traits::{GlApi, ShaderKind};

type Native = glow::Context;

/// [`GlApi`] over a loaded glow context
pub struct GlowApi {
    gl: Native,
}

impl GlowApi {
    /// Wrap a loaded context
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for as long as this value
    /// (and any program built from it) is used.
    pub unsafe fn new(gl: Native) -> Self {
        Self { gl }
    }

    /// Underlying context, for draw calls outside this crate
    pub fn context(&self) -> &Native {
        &self.gl
    }
}

const fn gl_kind(kind: ShaderKind) -> u32 {
    match kind {
        ShaderKind::Vertex => glow::VERTEX_SHADER,
        ShaderKind::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Bare GL name of a program object
#[cfg(not(target_arch = "wasm32"))]
fn native_id(program: glow::NativeProgram) -> String {
    program.0.get().to_string()
}

// SAFETY (all calls below): `GlowApi::new` requires the context to be current
// on this thread, and every handle passed in was produced by this context.
impl GlApi for GlowApi {
    type Shader = <Native as HasContext>::Shader;
    type Program = <Native as HasContext>::Program;
    type UniformLocation = <Native as HasContext>::UniformLocation;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(gl_kind(kind)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn program_id(&self, program: Self::Program) -> String {
        native_id(program)
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }
}
