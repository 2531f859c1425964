//! Shader compilation and program linking.

use note60_engine::gfx::{GraphicsApi, ShaderStage, check_error};

use crate::error::{BindingKind, SceneError, ShaderCompileError, UnknownBindingError};

/// A successfully compiled shader object, ready to attach.
#[derive(Debug)]
pub struct CompiledShader<G: GraphicsApi> {
    handle: G::Shader,
    stage: ShaderStage,
}

impl<G: GraphicsApi> CompiledShader<G> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> G::Shader {
        self.handle
    }
}

/// A linked program plus name-based binding lookup.
///
/// Lives as long as the render surface; programs are shared by every scene
/// object drawn with them.
#[derive(Debug)]
pub struct ShaderProgram<G: GraphicsApi> {
    name: String,
    handle: G::Program,
}

impl<G: GraphicsApi> ShaderProgram<G> {
    /// Compiles one stage. On failure the shader object is released and the
    /// driver log is returned; the log is never empty.
    pub fn compile_shader(
        gfx: &mut G,
        stage: ShaderStage,
        source: &str,
    ) -> Result<CompiledShader<G>, ShaderCompileError> {
        let handle = gfx
            .create_shader(stage)
            .map_err(|log| ShaderCompileError::Create { what: "shader", log })?;

        gfx.shader_source(handle, source);
        gfx.compile_shader(handle);

        if !gfx.shader_compile_status(handle) {
            let mut log = gfx.shader_info_log(handle);
            gfx.delete_shader(handle);
            if log.trim().is_empty() {
                log = format!("{stage} shader rejected without a compiler log");
            }
            log::error!("error compiling {stage} shader: {log}");
            return Err(ShaderCompileError::Compile { stage, log });
        }

        log::debug!("compiled {stage} shader {handle:?}");
        Ok(CompiledShader { handle, stage })
    }

    /// Links `vertex` and `fragment` into a program named `name`, makes it
    /// current and checks for pending GL errors.
    ///
    /// The shader objects stay alive so they can be attached to other
    /// programs.
    pub fn link(
        gfx: &mut G,
        name: &str,
        vertex: &CompiledShader<G>,
        fragment: &CompiledShader<G>,
    ) -> Result<Self, SceneError> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(ShaderCompileError::Link {
                program: name.to_string(),
                log: format!(
                    "expected vertex + fragment shaders, got {} + {}",
                    vertex.stage, fragment.stage
                ),
            }
            .into());
        }

        let handle = gfx
            .create_program()
            .map_err(|log| ShaderCompileError::Create { what: "program", log })?;

        gfx.attach_shader(handle, vertex.handle);
        gfx.attach_shader(handle, fragment.handle);
        gfx.link_program(handle);

        if !gfx.program_link_status(handle) {
            let mut log = gfx.program_info_log(handle);
            gfx.delete_program(handle);
            if log.trim().is_empty() {
                log = "program rejected without a linker log".to_string();
            }
            log::error!("error linking program `{name}`: {log}");
            return Err(ShaderCompileError::Link {
                program: name.to_string(),
                log,
            }
            .into());
        }

        gfx.use_program(Some(handle));
        if let Err(e) = check_error(gfx, &format!("{name} program")) {
            gfx.delete_program(handle);
            return Err(e.into());
        }

        log::debug!("linked program `{name}` ({handle:?})");
        Ok(Self {
            name: name.to_string(),
            handle,
        })
    }

    /// Compiles both stages from source and links them. The shader objects
    /// are released whatever the outcome.
    pub fn compile(
        gfx: &mut G,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, SceneError> {
        let vs = Self::compile_shader(gfx, ShaderStage::Vertex, vertex_source)?;
        let fs = match Self::compile_shader(gfx, ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(e) => {
                gfx.delete_shader(vs.handle);
                return Err(e.into());
            }
        };

        let program = Self::link(gfx, name, &vs, &fs);
        gfx.delete_shader(vs.handle);
        gfx.delete_shader(fs.handle);
        program
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> G::Program {
        self.handle
    }

    /// Makes this program current.
    pub fn bind(&self, gfx: &mut G) {
        gfx.use_program(Some(self.handle));
    }

    pub fn attribute_location(&self, gfx: &G, name: &str) -> Result<u32, UnknownBindingError> {
        gfx.attrib_location(self.handle, name)
            .ok_or_else(|| self.unknown(BindingKind::Attribute, name))
    }

    pub fn uniform_location(
        &self,
        gfx: &G,
        name: &str,
    ) -> Result<G::UniformLocation, UnknownBindingError> {
        gfx.uniform_location(self.handle, name)
            .ok_or_else(|| self.unknown(BindingKind::Uniform, name))
    }

    fn unknown(&self, kind: BindingKind, name: &str) -> UnknownBindingError {
        UnknownBindingError {
            program: self.name.clone(),
            kind,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShaderSources;
    use note60_engine::gfx::{RecordingGl, codes};

    fn builtin(gl: &mut RecordingGl) -> ShaderProgram<RecordingGl> {
        let src = ShaderSources::default();
        ShaderProgram::compile(gl, "note", &src.light_vertex, &src.passthrough_fragment).unwrap()
    }

    #[test]
    fn builtin_shaders_link_and_expose_bindings() {
        let mut gl = RecordingGl::new();
        let p = builtin(&mut gl);

        for a in ["a_Position", "a_Normal", "a_Color"] {
            assert!(p.attribute_location(&gl, a).is_ok(), "{a}");
        }
        for u in ["u_Model", "u_MVMatrix", "u_MVP", "u_LightPos"] {
            assert!(p.uniform_location(&gl, u).is_ok(), "{u}");
        }
        assert_eq!(gl.current_program(), Some(p.handle()));
    }

    #[test]
    fn grid_fragment_links_with_shared_vertex_shader() {
        let mut gl = RecordingGl::new();
        let src = ShaderSources::default();
        let vs = ShaderProgram::compile_shader(&mut gl, ShaderStage::Vertex, &src.light_vertex)
            .unwrap();
        let grid =
            ShaderProgram::compile_shader(&mut gl, ShaderStage::Fragment, &src.grid_fragment)
                .unwrap();
        let pass = ShaderProgram::compile_shader(
            &mut gl,
            ShaderStage::Fragment,
            &src.passthrough_fragment,
        )
        .unwrap();

        let a = ShaderProgram::link(&mut gl, "note", &vs, &pass).unwrap();
        let b = ShaderProgram::link(&mut gl, "floor", &vs, &grid).unwrap();
        assert_ne!(a.handle(), b.handle());
    }

    #[test]
    fn invalid_source_surfaces_compiler_log() {
        let mut gl = RecordingGl::new();
        let err = ShaderProgram::compile_shader(
            &mut gl,
            ShaderStage::Vertex,
            "uniform mat4 u_MVP;\nvoid main() {\n  gl_Position = u_MVP;\n",
        )
        .unwrap_err();

        assert!(matches!(err, ShaderCompileError::Compile { stage: ShaderStage::Vertex, .. }));
        assert!(!err.log().is_empty());
        assert!(err.to_string().contains("vertex shader failed to compile"));
    }

    #[test]
    fn link_failure_reports_program_name() {
        let mut gl = RecordingGl::new();
        let err = ShaderProgram::compile(
            &mut gl,
            "broken",
            "void main() { gl_Position = vec4(0.0); }\n",
            "precision mediump float;\nvarying vec4 v_Color;\nvoid main() { gl_FragColor = v_Color; }\n",
        )
        .unwrap_err();

        match err {
            SceneError::Shader(ShaderCompileError::Link { program, log }) => {
                assert_eq!(program, "broken");
                assert!(log.contains("v_Color"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let mut gl = RecordingGl::new();
        let src = ShaderSources::default();
        let vs = ShaderProgram::compile_shader(&mut gl, ShaderStage::Vertex, &src.light_vertex)
            .unwrap();
        let fs = ShaderProgram::compile_shader(
            &mut gl,
            ShaderStage::Fragment,
            &src.passthrough_fragment,
        )
        .unwrap();
        assert!(ShaderProgram::link(&mut gl, "swapped", &fs, &vs).is_err());
    }

    #[test]
    fn compile_releases_shader_objects() {
        let mut gl = RecordingGl::new();
        builtin(&mut gl);
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 1);

        let src = ShaderSources::default();
        let err = ShaderProgram::compile(&mut gl, "half", &src.light_vertex, "void main( {");
        assert!(err.is_err());
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 1);
    }

    #[test]
    fn unknown_binding_is_an_error_not_minus_one() {
        let mut gl = RecordingGl::new();
        let p = builtin(&mut gl);

        let err = p.uniform_location(&gl, "u_Time").unwrap_err();
        assert_eq!(err.kind, BindingKind::Uniform);
        assert_eq!(err.name, "u_Time");
        assert_eq!(err.to_string(), "uniform `u_Time` is not active in program `note`");

        let err = p.attribute_location(&gl, "a_TexCoord").unwrap_err();
        assert_eq!(err.kind, BindingKind::Attribute);
    }

    #[test]
    fn pending_gl_error_fails_post_link_checkpoint() {
        let mut gl = RecordingGl::new();
        gl.inject_error(codes::OUT_OF_MEMORY);
        let src = ShaderSources::default();
        let err = ShaderProgram::compile(&mut gl, "note", &src.light_vertex, &src.passthrough_fragment)
            .unwrap_err();

        match err {
            SceneError::Graphics(e) => {
                assert_eq!(e.label, "note program");
                assert_eq!(e.codes, vec![codes::OUT_OF_MEMORY]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_shaders(), 0);
    }
}
