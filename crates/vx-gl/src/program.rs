//! Program builder
//!
//! Compiles the vertex and fragment text of a [`ShaderSource`] into shader
//! objects, links them into a program object and reports diagnostics. A
//! failed compile does not stop the build: linking is still attempted, and the
//! shader objects are deleted right after the link whatever its outcome.

use std::path::Path;

use vx_preprocess::{LOG_TARGET, Preprocessor, ShaderSource};

use crate::error::{BuildError, BuildFailure};
use crate::traits::{GlApi, ShaderKind};

/// A linked (or failed-to-link) program object
///
/// The native handle is released when this value is dropped.
pub struct Program<'gl, G: GlApi + ?Sized> {
    gl: &'gl G,
    handle: G::Program,
}

impl<'gl, G: GlApi + ?Sized> Program<'gl, G> {
    /// Build from an existing source, failing on any compile or link error
    pub fn from_source(gl: &'gl G, source: &ShaderSource) -> Result<Self, BuildError> {
        ProgramBuilder::new(gl).build(source)?.into_result()
    }

    /// Split a combined shader file and build it
    pub fn from_file(
        gl: &'gl G,
        preprocessor: &Preprocessor,
        path: impl AsRef<Path>,
    ) -> Result<Self, BuildError> {
        let source = preprocessor.load_source(path)?;
        Self::from_source(gl, &source)
    }

    /// Native program identifier
    pub fn handle(&self) -> G::Program {
        self.handle
    }

    /// Activate this program for subsequent draw calls
    ///
    /// Replaces whatever program was current on the context.
    pub fn bind(&self) {
        self.gl.use_program(Some(self.handle));
    }

    /// Clear the current program on the context
    pub fn unbind(&self) {
        self.gl.use_program(None);
    }

    /// Location of a uniform, or `None` if the linker dropped or never saw it
    pub fn uniform_location(&self, name: &str) -> Option<G::UniformLocation> {
        self.gl.uniform_location(self.handle, name)
    }
}

impl<G: GlApi + ?Sized> Drop for Program<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.handle);
    }
}

impl<G: GlApi + ?Sized> std::fmt::Debug for Program<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("handle", &self.handle).finish()
    }
}

/// Outcome of one build: the program handle plus every failure seen
///
/// The handle exists even when compilation or linking failed.
pub struct BuildReport<'gl, G: GlApi + ?Sized> {
    program: Program<'gl, G>,
    failures: Vec<BuildFailure>,
}

impl<'gl, G: GlApi + ?Sized> BuildReport<'gl, G> {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    pub fn program(&self) -> &Program<'gl, G> {
        &self.program
    }

    /// Keep the program regardless of outcome
    pub fn into_program(self) -> Program<'gl, G> {
        self.program
    }

    /// The program if it compiled and linked; otherwise it is released
    pub fn into_result(self) -> Result<Program<'gl, G>, BuildError> {
        if self.failures.is_empty() {
            Ok(self.program)
        } else {
            Err(BuildError::Failed(self.failures))
        }
    }
}

impl<G: GlApi + ?Sized> std::fmt::Debug for BuildReport<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildReport")
            .field("program", &self.program)
            .field("failures", &self.failures)
            .finish()
    }
}

/// Compiles and links [`ShaderSource`]s against one context
pub struct ProgramBuilder<'gl, G: GlApi + ?Sized> {
    gl: &'gl G,
}

impl<'gl, G: GlApi + ?Sized> ProgramBuilder<'gl, G> {
    pub fn new(gl: &'gl G) -> Self {
        Self { gl }
    }

    /// Compile both stages, link, and release the shader objects
    ///
    /// Returns `Err` only if the driver refuses to allocate an object.
    /// Compile and link failures are logged and collected in the report.
    pub fn build(&self, source: &ShaderSource) -> Result<BuildReport<'gl, G>, BuildError> {
        let mut failures = Vec::new();

        let vertex = self.compile(
            ShaderKind::Vertex,
            source.vertex_source(),
            source.vertex_path(),
            &mut failures,
        )?;
        let fragment = match self.compile(
            ShaderKind::Fragment,
            source.fragment_source(),
            source.fragment_path(),
            &mut failures,
        ) {
            Ok(fragment) => fragment,
            Err(err) => {
                self.gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let handle = match self.gl.create_program() {
            Ok(handle) => handle,
            Err(message) => {
                self.gl.delete_shader(vertex);
                self.gl.delete_shader(fragment);
                log::error!(target: LOG_TARGET, "failed to create shader program: {message}");
                return Err(BuildError::ObjectCreation(message));
            }
        };
        let program = Program {
            gl: self.gl,
            handle,
        };

        self.gl.attach_shader(handle, vertex);
        self.gl.attach_shader(handle, fragment);
        self.gl.link_program(handle);

        if !self.gl.program_link_status(handle) {
            let failure = BuildFailure::Link {
                program: self.gl.program_id(handle),
                vertex_path: source.vertex_path().to_path_buf(),
                fragment_path: source.fragment_path().to_path_buf(),
                log: self.gl.program_info_log(handle),
            };
            log::error!(target: LOG_TARGET, "{failure}");
            failures.push(failure);
        }

        self.gl.delete_shader(vertex);
        self.gl.delete_shader(fragment);

        Ok(BuildReport { program, failures })
    }

    fn compile(
        &self,
        kind: ShaderKind,
        text: &str,
        path: &Path,
        failures: &mut Vec<BuildFailure>,
    ) -> Result<G::Shader, BuildError> {
        let shader = self.gl.create_shader(kind).map_err(|message| {
            log::error!(target: LOG_TARGET, "failed to create {kind} shader: {message}");
            BuildError::ObjectCreation(message)
        })?;

        self.gl.shader_source(shader, text);
        self.gl.compile_shader(shader);

        if !self.gl.shader_compile_status(shader) {
            let failure = BuildFailure::Compile {
                kind,
                path: path.to_path_buf(),
                log: self.gl.shader_info_log(shader),
            };
            log::error!(target: LOG_TARGET, "{failure}");
            failures.push(failure);
        }

        Ok(shader)
    }
}
