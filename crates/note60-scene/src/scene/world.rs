use std::rc::Rc;

use note60_engine::gfx::{GraphicsApi, ShaderStage};

use crate::config::{NoteSpec, SceneConfig};
use crate::error::SceneError;
use crate::shader::ShaderProgram;

use super::SceneObject;

/// Every GL resource the viewer draws: two programs, the notes and the floor.
///
/// Both programs share one vertex shader; the note program pairs it with the
/// passthrough fragment shader, the floor program with the grid one.
pub struct Scene<G: GraphicsApi> {
    note_program: Rc<ShaderProgram<G>>,
    floor_program: Rc<ShaderProgram<G>>,
    notes: Vec<SceneObject<G>>,
    floor: SceneObject<G>,
}

impl<G: GraphicsApi> Scene<G> {
    /// Compiles, links and uploads everything in `config`.
    ///
    /// Shader objects are released once both programs are linked. On failure
    /// every shader and program created so far is released too.
    pub fn build(gfx: &mut G, config: &SceneConfig) -> Result<Self, SceneError> {
        let mut created = Created::default();
        let built = Self::assemble(gfx, config, &mut created);
        created.release(gfx, built.is_err());
        built
    }

    fn assemble(
        gfx: &mut G,
        config: &SceneConfig,
        created: &mut Created<G>,
    ) -> Result<Self, SceneError> {
        let src = &config.shaders;

        let vertex = ShaderProgram::compile_shader(gfx, ShaderStage::Vertex, &src.light_vertex)?;
        created.shaders.push(vertex.handle());
        let grid = ShaderProgram::compile_shader(gfx, ShaderStage::Fragment, &src.grid_fragment)?;
        created.shaders.push(grid.handle());
        let passthrough =
            ShaderProgram::compile_shader(gfx, ShaderStage::Fragment, &src.passthrough_fragment)?;
        created.shaders.push(passthrough.handle());

        let note_program = Rc::new(ShaderProgram::link(gfx, "note", &vertex, &passthrough)?);
        created.programs.push(note_program.handle());
        let floor_program = Rc::new(ShaderProgram::link(gfx, "floor", &vertex, &grid)?);
        created.programs.push(floor_program.handle());

        let notes = config
            .notes
            .iter()
            .map(|spec| SceneObject::note(gfx, Rc::clone(&note_program), spec))
            .collect::<Result<Vec<_>, _>>()?;

        let floor = SceneObject::floor(gfx, Rc::clone(&floor_program), config.floor_depth)?;

        log::info!("scene ready: {} note(s) + floor", notes.len());
        Ok(Self {
            note_program,
            floor_program,
            notes,
            floor,
        })
    }

    /// Adds a note after construction; it is drawn after the existing ones.
    pub fn add_note(&mut self, gfx: &mut G, spec: &NoteSpec) -> Result<usize, SceneError> {
        let note = SceneObject::note(gfx, Rc::clone(&self.note_program), spec)?;
        self.notes.push(note);
        Ok(self.notes.len() - 1)
    }

    pub fn notes(&self) -> &[SceneObject<G>] {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut [SceneObject<G>] {
        &mut self.notes
    }

    pub fn floor(&self) -> &SceneObject<G> {
        &self.floor
    }

    pub fn note_program(&self) -> &ShaderProgram<G> {
        &self.note_program
    }

    pub fn floor_program(&self) -> &ShaderProgram<G> {
        &self.floor_program
    }

    /// Notes in insertion order, then the floor.
    pub fn draw_order(&self) -> impl Iterator<Item = &SceneObject<G>> {
        self.notes.iter().chain(std::iter::once(&self.floor))
    }
}

/// GL objects made by a build in progress.
struct Created<G: GraphicsApi> {
    shaders: Vec<G::Shader>,
    programs: Vec<G::Program>,
}

impl<G: GraphicsApi> Default for Created<G> {
    fn default() -> Self {
        Self {
            shaders: Vec::new(),
            programs: Vec::new(),
        }
    }
}

impl<G: GraphicsApi> Created<G> {
    /// Linked programs keep what they need, so shaders always go. Programs
    /// go only when the build failed.
    fn release(self, gfx: &mut G, failed: bool) {
        for shader in self.shaders {
            gfx.delete_shader(shader);
        }
        if failed {
            for program in self.programs {
                gfx.delete_program(program);
            }
        }
    }
}
