use std::collections::VecDeque;

use super::glsl::{self, Declarations};
use super::{ErrorCode, GraphicsApi, ShaderStage, codes};

/// One state-changing call observed by [`RecordingGl`].
///
/// Handles are the recording backend's own ids (`u32`, never 0).
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    ClearColor([f32; 4]),
    EnableDepthTest,
    Clear { color: bool, depth: bool },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    UseProgram(Option<u32>),
    UploadBuffer { buffer: u32, floats: usize },
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, buffer: u32, components: i32 },
    UniformMatrix4 { program: u32, name: String, value: [f32; 16] },
    UniformVec3 { program: u32, name: String, value: [f32; 3] },
    DrawTriangles { program: u32, first: i32, count: i32 },
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: Option<Result<Declarations, String>>,
    deleted: bool,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    /// `(attributes, uniforms)` once linked successfully.
    linked: Option<Result<(Vec<String>, Vec<String>), String>>,
    deleted: bool,
}

/// Headless [`GraphicsApi`] that records every call.
///
/// Shaders are checked by a small GLSL ES front-end, so sources with broken
/// structure fail to compile with a driver-style log, and attribute/uniform
/// locations resolve only for names the sources actually declare.
///
/// GL misuse (unknown handles, drawing without a program, uniform uploads
/// with a location from another program) queues the same error codes a driver
/// would report. Extra codes can be queued with [`RecordingGl::inject_error`].
#[derive(Debug, Default)]
pub struct RecordingGl {
    shaders: Vec<ShaderRecord>,
    programs: Vec<ProgramRecord>,
    buffers: Vec<usize>,
    enabled_attribs: Vec<u32>,
    current_program: Option<u32>,
    depth_test: bool,
    pending_errors: VecDeque<ErrorCode>,
    /// `(polls left, code)`: errors that surface only after later polls.
    deferred_errors: Vec<(usize, ErrorCode)>,
    calls: Vec<GlCall>,
}

/// Uniform location in the recording backend: owning program + index into
/// that program's uniform list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecordedUniform {
    program: u32,
    index: usize,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error code to be returned by the next `get_error`.
    pub fn inject_error(&mut self, code: ErrorCode) {
        self.pending_errors.push_back(code);
    }

    /// Queues `code` so that it is first reported by the `get_error` call
    /// after the next `polls` ones, like a driver reporting an error late.
    pub fn inject_error_after_polls(&mut self, polls: usize, code: ErrorCode) {
        self.deferred_errors.push((polls, code));
    }

    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns and forgets the recorded calls.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn current_program(&self) -> Option<u32> {
        self.current_program
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn is_attrib_enabled(&self, index: u32) -> bool {
        self.enabled_attribs.contains(&index)
    }

    /// `(program, first, count)` of every recorded draw, in order.
    pub fn draws(&self) -> Vec<(u32, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawTriangles { program, first, count } => Some((*program, *first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Last matrix uploaded to uniform `name` of `program`.
    pub fn last_matrix(&self, program: u32, name: &str) -> Option<[f32; 16]> {
        self.calls.iter().rev().find_map(|c| match c {
            GlCall::UniformMatrix4 { program: p, name: n, value } if *p == program && n == name => {
                Some(*value)
            }
            _ => None,
        })
    }

    /// Last vector uploaded to uniform `name` of `program`.
    pub fn last_vec3(&self, program: u32, name: &str) -> Option<[f32; 3]> {
        self.calls.iter().rev().find_map(|c| match c {
            GlCall::UniformVec3 { program: p, name: n, value } if *p == program && n == name => {
                Some(*value)
            }
            _ => None,
        })
    }

    /// Shader objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.shaders.iter().filter(|s| !s.deleted).count()
    }

    /// Program objects created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.programs.iter().filter(|p| !p.deleted).count()
    }

    /// Source text last given to `shader`.
    pub fn shader_text(&self, shader: u32) -> Option<&str> {
        self.shader(shader).map(|s| s.source.as_str())
    }

    fn error(&mut self, code: ErrorCode) {
        self.pending_errors.push_back(code);
    }

    fn shader(&self, id: u32) -> Option<&ShaderRecord> {
        let rec = self.shaders.get((id as usize).checked_sub(1)?)?;
        (!rec.deleted).then_some(rec)
    }

    fn shader_mut(&mut self, id: u32) -> Option<&mut ShaderRecord> {
        let rec = self.shaders.get_mut((id as usize).checked_sub(1)?)?;
        (!rec.deleted).then_some(rec)
    }

    fn program(&self, id: u32) -> Option<&ProgramRecord> {
        let rec = self.programs.get((id as usize).checked_sub(1)?)?;
        (!rec.deleted).then_some(rec)
    }

    fn linked(&self, id: u32) -> Option<&(Vec<String>, Vec<String>)> {
        self.program(id)?.linked.as_ref()?.as_ref().ok()
    }

    fn buffer_exists(&self, id: u32) -> bool {
        (id as usize)
            .checked_sub(1)
            .is_some_and(|i| i < self.buffers.len())
    }

    /// Validates a uniform upload against the current program and returns the
    /// uniform's name.
    fn uniform_target(&mut self, location: &RecordedUniform) -> Option<(u32, String)> {
        let Some(current) = self.current_program else {
            self.error(codes::INVALID_OPERATION);
            return None;
        };
        if location.program != current {
            self.error(codes::INVALID_OPERATION);
            return None;
        }
        match self.linked(current).and_then(|(_, u)| u.get(location.index)) {
            Some(name) => Some((current, name.clone())),
            None => {
                self.error(codes::INVALID_OPERATION);
                None
            }
        }
    }
}

impl GraphicsApi for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = RecordedUniform;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, String> {
        self.shaders.push(ShaderRecord {
            stage,
            source: String::new(),
            compiled: None,
            deleted: false,
        });
        Ok(self.shaders.len() as u32)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        match self.shader_mut(shader) {
            Some(rec) => rec.source = source.to_string(),
            None => self.error(codes::INVALID_VALUE),
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        match self.shader_mut(shader) {
            Some(rec) => rec.compiled = Some(glsl::check(rec.stage, &rec.source)),
            None => self.error(codes::INVALID_VALUE),
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shader(shader)
            .is_some_and(|rec| matches!(rec.compiled, Some(Ok(_))))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.shader(shader).and_then(|rec| rec.compiled.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        match self.shader_mut(shader) {
            Some(rec) => rec.deleted = true,
            None => self.error(codes::INVALID_VALUE),
        }
    }

    fn create_program(&mut self) -> Result<u32, String> {
        self.programs.push(ProgramRecord::default());
        Ok(self.programs.len() as u32)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if self.shader(shader).is_none() {
            self.error(codes::INVALID_VALUE);
            return;
        }
        let Some(rec) = self
            .programs
            .get_mut((program as usize).wrapping_sub(1))
            .filter(|p| !p.deleted)
        else {
            self.pending_errors.push_back(codes::INVALID_VALUE);
            return;
        };
        if rec.attached.contains(&shader) {
            self.pending_errors.push_back(codes::INVALID_OPERATION);
            return;
        }
        rec.attached.push(shader);
    }

    fn link_program(&mut self, program: u32) {
        let Some(rec) = self.program(program) else {
            self.error(codes::INVALID_VALUE);
            return;
        };

        let mut vertex: Option<&Declarations> = None;
        let mut fragment: Option<&Declarations> = None;
        let mut outcome = Ok(());

        for id in &rec.attached {
            // Shaders flagged for deletion stay usable while attached.
            let Some(sh) = self.shaders.get(*id as usize - 1) else { continue };
            let decls = match &sh.compiled {
                Some(Ok(d)) => d,
                _ => {
                    outcome = Err(format!("ERROR: {} shader {id} is not compiled", sh.stage));
                    break;
                }
            };
            let slot = match sh.stage {
                ShaderStage::Vertex => &mut vertex,
                ShaderStage::Fragment => &mut fragment,
            };
            if slot.replace(decls).is_some() {
                outcome = Err(format!("ERROR: more than one {} shader attached", sh.stage));
                break;
            }
        }

        let linked = outcome.and_then(|()| match (vertex, fragment) {
            (Some(vs), Some(fs)) => {
                glsl::link(vs, fs)?;
                let mut uniforms = vs.uniforms.clone();
                for u in &fs.uniforms {
                    if !uniforms.contains(u) {
                        uniforms.push(u.clone());
                    }
                }
                Ok((vs.attributes.clone(), uniforms))
            }
            (None, _) => Err("ERROR: no vertex shader attached".to_string()),
            (_, None) => Err("ERROR: no fragment shader attached".to_string()),
        });

        if let Some(rec) = self.programs.get_mut(program as usize - 1) {
            rec.linked = Some(linked);
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.linked(program).is_some()
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.program(program).and_then(|p| p.linked.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&mut self, program: u32) {
        match self
            .programs
            .get_mut((program as usize).wrapping_sub(1))
            .filter(|p| !p.deleted)
        {
            Some(rec) => rec.deleted = true,
            None => self.pending_errors.push_back(codes::INVALID_VALUE),
        }
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: Option<u32>) {
        if let Some(id) = program {
            if self.program(id).is_none() {
                self.error(codes::INVALID_VALUE);
                return;
            }
            if self.linked(id).is_none() {
                self.error(codes::INVALID_OPERATION);
                return;
            }
        }
        self.current_program = program;
        self.calls.push(GlCall::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let (attributes, _) = self.linked(program)?;
        attributes.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<RecordedUniform> {
        let (_, uniforms) = self.linked(program)?;
        // Arrays answer to both `name` and `name[0]`.
        let name = name.strip_suffix("[0]").unwrap_or(name);
        uniforms
            .iter()
            .position(|u| u == name)
            .map(|index| RecordedUniform { program, index })
    }

    fn create_buffer(&mut self) -> Result<u32, String> {
        self.buffers.push(0);
        Ok(self.buffers.len() as u32)
    }

    fn upload_f32(&mut self, buffer: u32, data: &[f32]) {
        if !self.buffer_exists(buffer) {
            self.error(codes::INVALID_OPERATION);
            return;
        }
        self.buffers[buffer as usize - 1] = data.len();
        self.calls.push(GlCall::UploadBuffer {
            buffer,
            floats: data.len(),
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        if !self.enabled_attribs.contains(&index) {
            self.enabled_attribs.push(index);
        }
        self.calls.push(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(&mut self, index: u32, buffer: u32, components: i32) {
        if !self.buffer_exists(buffer) {
            self.error(codes::INVALID_OPERATION);
            return;
        }
        if !(1..=4).contains(&components) {
            self.error(codes::INVALID_VALUE);
            return;
        }
        self.calls.push(GlCall::VertexAttribPointer {
            index,
            buffer,
            components,
        });
    }

    fn uniform_matrix4(&mut self, location: &RecordedUniform, value: &[f32; 16]) {
        if let Some((program, name)) = self.uniform_target(location) {
            self.calls.push(GlCall::UniformMatrix4 {
                program,
                name,
                value: *value,
            });
        }
    }

    fn uniform_vec3(&mut self, location: &RecordedUniform, value: [f32; 3]) {
        if let Some((program, name)) = self.uniform_target(location) {
            self.calls.push(GlCall::UniformVec3 {
                program,
                name,
                value,
            });
        }
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.calls.push(GlCall::ClearColor(rgba));
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
        self.calls.push(GlCall::EnableDepthTest);
    }

    fn clear(&mut self, color: bool, depth: bool) {
        self.calls.push(GlCall::Clear { color, depth });
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width < 0 || height < 0 {
            self.error(codes::INVALID_VALUE);
            return;
        }
        self.calls.push(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_triangles(&mut self, first: i32, count: i32) {
        let Some(program) = self.current_program else {
            self.error(codes::INVALID_OPERATION);
            return;
        };
        if first < 0 || count < 0 {
            self.error(codes::INVALID_VALUE);
            return;
        }
        self.calls.push(GlCall::DrawTriangles {
            program,
            first,
            count,
        });
    }

    fn get_error(&mut self) -> Option<ErrorCode> {
        let pending = &mut self.pending_errors;
        self.deferred_errors.retain_mut(|(polls, code)| {
            if *polls == 0 {
                pending.push_back(*code);
                return false;
            }
            *polls -= 1;
            true
        });
        self.pending_errors.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "uniform mat4 u_MVP;\nattribute vec4 a_Position;\nvarying vec4 v_Color;\nvoid main() { v_Color = a_Position; gl_Position = u_MVP * a_Position; }\n";
    const FS: &str = "precision mediump float;\nuniform vec3 u_Tint;\nvarying vec4 v_Color;\nvoid main() { gl_FragColor = v_Color; }\n";

    fn shader(gl: &mut RecordingGl, stage: ShaderStage, src: &str) -> u32 {
        let s = gl.create_shader(stage).unwrap();
        gl.shader_source(s, src);
        gl.compile_shader(s);
        s
    }

    fn linked_program(gl: &mut RecordingGl) -> u32 {
        let vs = shader(gl, ShaderStage::Vertex, VS);
        let fs = shader(gl, ShaderStage::Fragment, FS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);
        p
    }

    #[test]
    fn link_resolves_declared_names_only() {
        let mut gl = RecordingGl::new();
        let p = linked_program(&mut gl);

        assert!(gl.program_link_status(p));
        assert_eq!(gl.attrib_location(p, "a_Position"), Some(0));
        assert!(gl.uniform_location(p, "u_MVP").is_some());
        assert!(gl.uniform_location(p, "u_Tint").is_some());
        assert!(gl.uniform_location(p, "u_Missing").is_none());
        assert!(gl.attrib_location(p, "a_Normal").is_none());
    }

    #[test]
    fn compile_failure_keeps_log() {
        let mut gl = RecordingGl::new();
        let s = shader(&mut gl, ShaderStage::Vertex, "void main() {");
        assert!(!gl.shader_compile_status(s));
        assert!(!gl.shader_info_log(s).is_empty());
    }

    #[test]
    fn link_without_fragment_fails() {
        let mut gl = RecordingGl::new();
        let vs = shader(&mut gl, ShaderStage::Vertex, VS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.link_program(p);
        assert!(!gl.program_link_status(p));
        assert!(gl.program_info_log(p).contains("fragment"));
    }

    #[test]
    fn draw_without_program_queues_invalid_operation() {
        let mut gl = RecordingGl::new();
        gl.draw_triangles(0, 6);
        assert_eq!(gl.get_error(), Some(codes::INVALID_OPERATION));
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn uniform_from_other_program_is_rejected() {
        let mut gl = RecordingGl::new();
        let a = linked_program(&mut gl);
        let b = linked_program(&mut gl);
        let loc_a = gl.uniform_location(a, "u_MVP").unwrap();

        gl.use_program(Some(b));
        gl.uniform_matrix4(&loc_a, &[0.0; 16]);
        assert_eq!(gl.get_error(), Some(codes::INVALID_OPERATION));

        gl.use_program(Some(a));
        gl.uniform_matrix4(&loc_a, &[1.0; 16]);
        assert_eq!(gl.get_error(), None);
        assert_eq!(gl.last_matrix(a, "u_MVP"), Some([1.0; 16]));
    }

    #[test]
    fn array_uniform_resolves_by_base_name_and_first_element() {
        let mut gl = RecordingGl::new();
        let vs = shader(
            &mut gl,
            ShaderStage::Vertex,
            "#version 100\nuniform vec4 u_Colors[2];\nattribute vec4 a_Position;\nvarying vec4 v_Color;\nvoid main() { v_Color = u_Colors[0]; gl_Position = a_Position; }\n",
        );
        let fs = shader(&mut gl, ShaderStage::Fragment, FS);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);

        assert!(gl.program_link_status(p));
        assert_eq!(gl.uniform_location(p, "u_Colors"), gl.uniform_location(p, "u_Colors[0]"));
        assert!(gl.uniform_location(p, "u_Colors").is_some());
    }

    #[test]
    fn deferred_error_surfaces_after_given_polls() {
        let mut gl = RecordingGl::new();
        gl.inject_error_after_polls(2, codes::OUT_OF_MEMORY);
        assert_eq!(gl.get_error(), None);
        assert_eq!(gl.get_error(), None);
        assert_eq!(gl.get_error(), Some(codes::OUT_OF_MEMORY));
        assert_eq!(gl.get_error(), None);
    }

    #[test]
    fn records_draws_against_current_program() {
        let mut gl = RecordingGl::new();
        let p = linked_program(&mut gl);
        gl.use_program(Some(p));
        gl.draw_triangles(0, 6);
        assert_eq!(gl.draws(), vec![(p, 0, 6)]);
    }
}
