//! Mock graphics API for testing
//!
//! Provides a MockGl that implements [`GlApi`] and records every state-
//! changing call for test assertions, without requiring a GPU context.
//! Compile and link outcomes can be scripted per test.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::traits::{GlApi, ShaderKind};

/// Record of a state-changing call for test inspection
///
/// Status and info-log queries are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlCall {
    CreateShader { id: u32, kind: ShaderKind },
    ShaderSource { shader: u32, source: String },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
}

#[derive(Debug)]
struct MockShader {
    kind: ShaderKind,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u32,
    calls: Vec<GlCall>,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current: Option<u32>,
    compile_failures: HashMap<ShaderKind, String>,
    link_failure: Option<String>,
    refuse_objects: Option<String>,
}

impl MockState {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A mock GL context that records calls and hands out sequential ids
///
/// Ids start at 1; 0 is never handed out, matching GL's "no object" value.
#[derive(Debug, Default)]
pub struct MockGl {
    state: RefCell<MockState>,
}

impl MockGl {
    /// Create a new mock context where everything compiles and links
    pub fn new() -> Self {
        Self::default()
    }

    // === Scripting ===

    /// Make every subsequent compile of `kind` fail with `log`
    pub fn fail_compile(&self, kind: ShaderKind, log: impl Into<String>) {
        self.state.borrow_mut().compile_failures.insert(kind, log.into());
    }

    /// Make every subsequent link fail with `log`
    pub fn fail_link(&self, log: impl Into<String>) {
        self.state.borrow_mut().link_failure = Some(log.into());
    }

    /// Make object creation fail with `message`
    pub fn refuse_objects(&self, message: impl Into<String>) {
        self.state.borrow_mut().refuse_objects = Some(message.into());
    }

    // === Inspection ===

    /// All recorded calls, oldest first
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Shader objects created and not yet deleted
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Program objects created and not yet deleted
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// Program made current by the last `use_program`
    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    /// Text most recently submitted to a shader of `kind`
    pub fn source_for(&self, kind: ShaderKind) -> Option<String> {
        let state = self.state.borrow();
        let kind_of = |shader: u32| {
            state.calls.iter().find_map(|call| match call {
                GlCall::CreateShader { id, kind: created } if *id == shader => Some(*created),
                _ => None,
            })
        };
        state.calls.iter().rev().find_map(|call| match call {
            GlCall::ShaderSource { shader, source } if kind_of(*shader) == Some(kind) => {
                Some(source.clone())
            }
            _ => None,
        })
    }
}

/// Names declared as `uniform <type> <name>;` at the start of a line
fn declared_uniforms(source: &str) -> impl Iterator<Item = &str> {
    source.lines().filter_map(|line| {
        let declaration = line.trim().strip_prefix("uniform ")?;
        let name = declaration.split_whitespace().last()?;
        let name = name.trim_end_matches(';');
        let name = name.split('[').next().unwrap_or(name);
        (!name.is_empty()).then_some(name)
    })
}

impl GlApi for MockGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = i32;

    fn create_shader(&self, kind: ShaderKind) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.refuse_objects {
            return Err(message.clone());
        }
        let id = state.allocate();
        state.shaders.insert(
            id,
            MockShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.calls.push(GlCall::CreateShader { id, kind });
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.shaders.get_mut(&shader) {
            object.source = source.to_string();
        }
        state.calls.push(GlCall::ShaderSource {
            shader,
            source: source.to_string(),
        });
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let MockState { shaders, compile_failures, calls, .. } = &mut *state;
        if let Some(object) = shaders.get_mut(&shader) {
            match compile_failures.get(&object.kind) {
                Some(log) => {
                    object.compiled = false;
                    object.log = log.clone();
                }
                None => {
                    object.compiled = true;
                    object.log.clear();
                }
            }
        }
        calls.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.refuse_objects {
            return Err(message.clone());
        }
        let id = state.allocate();
        state.programs.insert(id, MockProgram::default());
        state.calls.push(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.push(shader);
        }
        state.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let MockState { shaders, programs, link_failure, calls, .. } = &mut *state;
        if let Some(object) = programs.get_mut(&program) {
            let attached: Vec<&MockShader> =
                object.attached.iter().filter_map(|id| shaders.get(id)).collect();

            let outcome = if let Some(log) = link_failure {
                Err(log.clone())
            } else if attached.iter().any(|s| !s.compiled) {
                Err("error: attached shader failed to compile".to_string())
            } else {
                Ok(())
            };

            match outcome {
                Ok(()) => {
                    let mut uniforms = Vec::new();
                    for name in attached.iter().flat_map(|s| declared_uniforms(&s.source)) {
                        if !uniforms.iter().any(|u| u == name) {
                            uniforms.push(name.to_string());
                        }
                    }
                    object.linked = true;
                    object.log.clear();
                    object.uniforms = uniforms;
                }
                Err(log) => {
                    object.linked = false;
                    object.log = log;
                    object.uniforms.clear();
                }
            }
        }
        calls.push(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current == Some(program) {
            state.current = None;
        }
        state.calls.push(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.current = program;
        state.calls.push(GlCall::UseProgram(program));
    }

    fn program_id(&self, program: u32) -> String {
        program.to_string()
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        let state = self.state.borrow();
        let object = state.programs.get(&program).filter(|p| p.linked)?;
        object
            .uniforms
            .iter()
            .position(|u| u == name)
            .and_then(|index| i32::try_from(index).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mock_is_empty() {
        let gl = MockGl::new();
        assert_eq!(gl.call_count(), 0);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.current_program(), None);
    }

    #[test]
    fn test_ids_are_sequential_and_nonzero() {
        let gl = MockGl::new();
        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        let program = gl.create_program().unwrap();
        assert_eq!(vs, 1);
        assert_eq!(program, 2);
    }

    #[test]
    fn test_compile_scripting() {
        let gl = MockGl::new();
        gl.fail_compile(ShaderKind::Fragment, "bad fragment");

        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        let fs = gl.create_shader(ShaderKind::Fragment).unwrap();
        gl.compile_shader(vs);
        gl.compile_shader(fs);

        assert!(gl.shader_compile_status(vs));
        assert!(!gl.shader_compile_status(fs));
        assert_eq!(gl.shader_info_log(vs), "");
        assert_eq!(gl.shader_info_log(fs), "bad fragment");
    }

    #[test]
    fn test_uncompiled_shader_fails_link() {
        let gl = MockGl::new();
        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        let program = gl.create_program().unwrap();
        gl.attach_shader(program, vs);
        gl.link_program(program);

        assert!(!gl.program_link_status(program));
        assert!(gl.program_info_log(program).contains("failed to compile"));
    }

    #[test]
    fn test_delete_tracks_live_objects() {
        let gl = MockGl::new();
        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        let program = gl.create_program().unwrap();
        gl.use_program(Some(program));
        assert_eq!(gl.live_shaders(), 1);

        gl.delete_shader(vs);
        gl.delete_program(program);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.current_program(), None);
    }

    #[test]
    fn test_refuse_objects() {
        let gl = MockGl::new();
        gl.refuse_objects("out of memory");
        assert_eq!(gl.create_shader(ShaderKind::Vertex), Err("out of memory".to_string()));
        assert_eq!(gl.create_program(), Err("out of memory".to_string()));
        assert_eq!(gl.call_count(), 0);
    }

    #[test]
    fn test_source_for_kind() {
        let gl = MockGl::new();
        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        let fs = gl.create_shader(ShaderKind::Fragment).unwrap();
        gl.shader_source(vs, "vertex text");
        gl.shader_source(fs, "fragment text");

        assert_eq!(gl.source_for(ShaderKind::Vertex).as_deref(), Some("vertex text"));
        assert_eq!(gl.source_for(ShaderKind::Fragment).as_deref(), Some("fragment text"));
    }

    #[test]
    fn test_declared_uniforms() {
        let source = "uniform mat4 u_mvp;\n  uniform sampler2D u_tex;\n\
                      uniform vec3 u_lights[4];\nin vec2 uv;\n";
        let names: Vec<&str> = declared_uniforms(source).collect();
        assert_eq!(names, vec!["u_mvp", "u_tex", "u_lights"]);
    }

    #[test]
    fn test_clear_calls() {
        let gl = MockGl::new();
        gl.use_program(None);
        assert_eq!(gl.call_count(), 1);
        gl.clear_calls();
        assert_eq!(gl.call_count(), 0);
    }
}
