use std::rc::Rc;

use glam::{Mat4, Vec3};
use note60_engine::gfx::{GraphicsApi, GraphicsError, RenderCtx, check_error};
use note60_engine::math::translated;

use crate::config::NoteSpec;
use crate::error::SceneError;
use crate::geometry::{
    COLOR_COMPONENTS, GeometryBuffer, GpuGeometry, NORMAL_COMPONENTS, POSITION_COMPONENTS,
};
use crate::shader::ShaderProgram;

use super::OrientationHook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Note { message: String },
    Floor,
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Note { .. } => "note",
            ObjectKind::Floor => "floor",
        }
    }
}

/// Matrices one draw uploads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectTransforms {
    pub model: Mat4,
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
}

/// Attribute and uniform locations the lighting shader needs.
struct Bindings<G: GraphicsApi> {
    position: u32,
    normal: u32,
    color: u32,
    model: G::UniformLocation,
    model_view: G::UniformLocation,
    model_view_projection: G::UniformLocation,
    light_pos: G::UniformLocation,
}

impl<G: GraphicsApi> Bindings<G> {
    fn resolve(gfx: &G, program: &ShaderProgram<G>) -> Result<Self, SceneError> {
        Ok(Self {
            position: program.attribute_location(gfx, "a_Position")?,
            normal: program.attribute_location(gfx, "a_Normal")?,
            color: program.attribute_location(gfx, "a_Color")?,
            model: program.uniform_location(gfx, "u_Model")?,
            model_view: program.uniform_location(gfx, "u_MVMatrix")?,
            model_view_projection: program.uniform_location(gfx, "u_MVP")?,
            light_pos: program.uniform_location(gfx, "u_LightPos")?,
        })
    }
}

/// A mesh placed in the world and drawn with a shared program.
///
/// Owns its vertex buffers; shares the program with every other object of the
/// same kind.
pub struct SceneObject<G: GraphicsApi> {
    kind: ObjectKind,
    program: Rc<ShaderProgram<G>>,
    geometry: GpuGeometry<G>,
    bindings: Bindings<G>,
    position: Vec3,
    model: Mat4,
    orientation: Option<Box<dyn OrientationHook>>,
}

impl<G: GraphicsApi> SceneObject<G> {
    /// Uploads `geometry`, resolves the program's bindings and enables the
    /// vertex attribute arrays. The object starts at the origin.
    pub fn new(
        gfx: &mut G,
        kind: ObjectKind,
        program: Rc<ShaderProgram<G>>,
        geometry: &GeometryBuffer,
    ) -> Result<Self, SceneError> {
        let gpu = geometry.upload(gfx)?;

        program.bind(gfx);
        let bindings = Bindings::resolve(gfx, &program)?;
        gfx.enable_vertex_attrib_array(bindings.position);
        gfx.enable_vertex_attrib_array(bindings.normal);
        gfx.enable_vertex_attrib_array(bindings.color);

        check_error(gfx, &format!("{} program params", kind.label()))?;

        Ok(Self {
            kind,
            program,
            geometry: gpu,
            bindings,
            position: Vec3::ZERO,
            model: Mat4::IDENTITY,
            orientation: None,
        })
    }

    /// A note quad placed at `spec.position`.
    pub fn note(
        gfx: &mut G,
        program: Rc<ShaderProgram<G>>,
        spec: &NoteSpec,
    ) -> Result<Self, SceneError> {
        let kind = ObjectKind::Note {
            message: spec.message.clone(),
        };
        let mut note = Self::new(gfx, kind, program, &GeometryBuffer::note())?;
        note.set_model(spec.position);
        log::debug!("note {:?} placed at {}", spec.message, spec.position);
        Ok(note)
    }

    /// The floor, `depth` units below the viewer.
    pub fn floor(
        gfx: &mut G,
        program: Rc<ShaderProgram<G>>,
        depth: f32,
    ) -> Result<Self, SceneError> {
        let mut floor = Self::new(gfx, ObjectKind::Floor, program, &GeometryBuffer::floor())?;
        floor.set_model(Vec3::new(0.0, -depth, 0.0));
        Ok(floor)
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// The note's text, `None` for the floor.
    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Note { message } => Some(message),
            ObjectKind::Floor => None,
        }
    }

    pub fn program(&self) -> &ShaderProgram<G> {
        &self.program
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    /// Places the object at `translation`. Without an orientation hook the
    /// model matrix is a pure translation.
    pub fn set_model(&mut self, translation: Vec3) {
        self.position = translation;
        self.model = translated(Mat4::IDENTITY, translation);
        if let Some(hook) = &self.orientation {
            self.model *= hook.orientation(translation);
        }
    }

    /// Installs (or removes) the orientation hook and re-applies placement.
    pub fn set_orientation_hook(&mut self, hook: Option<Box<dyn OrientationHook>>) {
        self.orientation = hook;
        self.set_model(self.position);
    }

    pub fn transforms(&self, view: Mat4, projection: Mat4) -> ObjectTransforms {
        let model_view = view * self.model;
        ObjectTransforms {
            model: self.model,
            model_view,
            model_view_projection: projection * model_view,
        }
    }

    /// Binds this object's program and buffers, uploads its matrices and the
    /// eye-space light, and draws the mesh. Returns the vertex count drawn.
    ///
    /// Leaves the program and attribute bindings in place for whoever draws
    /// next.
    pub fn draw(&self, ctx: &mut RenderCtx<'_, G>) -> Result<usize, GraphicsError> {
        let t = self.transforms(ctx.view, ctx.projection);
        let b = &self.bindings;
        let gfx = &mut *ctx.gfx;

        self.program.bind(gfx);

        gfx.uniform_vec3(&b.light_pos, ctx.light_pos_eye.truncate().to_array());
        gfx.uniform_matrix4(&b.model, &t.model.to_cols_array());
        gfx.uniform_matrix4(&b.model_view, &t.model_view.to_cols_array());
        gfx.uniform_matrix4(
            &b.model_view_projection,
            &t.model_view_projection.to_cols_array(),
        );

        gfx.vertex_attrib_pointer(
            b.position,
            self.geometry.positions,
            POSITION_COMPONENTS as i32,
        );
        gfx.vertex_attrib_pointer(b.normal, self.geometry.normals, NORMAL_COMPONENTS as i32);
        gfx.vertex_attrib_pointer(b.color, self.geometry.colors, COLOR_COMPONENTS as i32);

        let count = self.geometry.vertex_count;
        gfx.draw_triangles(0, count as i32);

        check_error(gfx, &format!("drawing {}", self.label()))?;
        Ok(count)
    }
}
