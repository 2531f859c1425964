use std::fmt;

/// Error code as returned by `glGetError`.
pub type ErrorCode = u32;

/// GL error codes a backend may report.
pub mod codes {
    use super::ErrorCode;

    pub const INVALID_ENUM: ErrorCode = 0x0500;
    pub const INVALID_VALUE: ErrorCode = 0x0501;
    pub const INVALID_OPERATION: ErrorCode = 0x0502;
    pub const OUT_OF_MEMORY: ErrorCode = 0x0505;
    pub const INVALID_FRAMEBUFFER_OPERATION: ErrorCode = 0x0506;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The GL ES 2.0 calls the scene layer issues.
///
/// Every call mutates the backend's global binding state (current program,
/// bound buffers, uniform values of the current program), exactly as the
/// underlying GL does. Callers own the ordering.
///
/// Handles are backend-native; `0`-style "no object" values never appear.
pub trait GraphicsApi {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug + PartialEq;
    type Buffer: Copy + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // ── shaders ──────────────────────────────────────────────────────────
    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&mut self, shader: Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    // ── programs ─────────────────────────────────────────────────────────
    fn create_program(&mut self) -> Result<Self::Program, String>;
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    fn link_program(&mut self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&mut self, program: Self::Program);
    fn use_program(&mut self, program: Option<Self::Program>);

    /// `None` if `name` is not an active attribute of the linked program.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// `None` if `name` is not an active uniform of the linked program.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    // ── vertex data ──────────────────────────────────────────────────────
    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;

    /// Replaces the contents of `buffer` with `data` (static draw usage).
    fn upload_f32(&mut self, buffer: Self::Buffer, data: &[f32]);
    fn enable_vertex_attrib_array(&mut self, index: u32);

    /// Sources attribute `index` from tightly packed floats in `buffer`,
    /// `components` per vertex.
    fn vertex_attrib_pointer(&mut self, index: u32, buffer: Self::Buffer, components: i32);

    // ── uniforms (current program) ───────────────────────────────────────
    fn uniform_matrix4(&mut self, location: &Self::UniformLocation, value: &[f32; 16]);
    fn uniform_vec3(&mut self, location: &Self::UniformLocation, value: [f32; 3]);

    // ── frame state / draws ──────────────────────────────────────────────
    fn clear_color(&mut self, rgba: [f32; 4]);
    fn enable_depth_test(&mut self);
    fn clear(&mut self, color: bool, depth: bool);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// `glDrawArrays(GL_TRIANGLES, first, count)`.
    fn draw_triangles(&mut self, first: i32, count: i32);

    /// Pops one pending error code, `None` once the queue is empty.
    fn get_error(&mut self) -> Option<ErrorCode>;
}
