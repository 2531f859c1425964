use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};

/// A note to place in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSpec {
    /// Text attached to the note. Kept with the object, not rendered.
    pub message: String,
    pub position: Vec3,
}

impl NoteSpec {
    pub fn new(message: impl Into<String>, position: Vec3) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// GLSL ES sources for the three shaders the scene links.
///
/// The vertex shader is shared by both programs; each fragment shader gives
/// one program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSources {
    pub light_vertex: Cow<'static, str>,
    pub grid_fragment: Cow<'static, str>,
    pub passthrough_fragment: Cow<'static, str>,
}

impl ShaderSources {
    /// Loads `light_vertex.glsl`, `grid_fragment.glsl` and
    /// `passthrough_fragment.glsl` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<Cow<'static, str>> {
            let path = dir.join(name);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read shader {}", path.display()))?;
            Ok(Cow::Owned(text))
        };

        Ok(Self {
            light_vertex: read("light_vertex.glsl")?,
            grid_fragment: read("grid_fragment.glsl")?,
            passthrough_fragment: read("passthrough_fragment.glsl")?,
        })
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            light_vertex: Cow::Borrowed(include_str!("shaders/light_vertex.glsl")),
            grid_fragment: Cow::Borrowed(include_str!("shaders/grid_fragment.glsl")),
            passthrough_fragment: Cow::Borrowed(include_str!("shaders/passthrough_fragment.glsl")),
        }
    }
}

/// Scene constants. The defaults define what the viewer sees.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub z_near: f32,
    pub z_far: f32,

    /// Camera sits this far along +Z, looking at the origin.
    pub camera_z: f32,

    /// Floor is placed this far below the viewer.
    pub floor_depth: f32,

    /// Light position in world space, kept just above the viewer.
    pub light_pos_world: Vec4,

    pub clear_color: [f32; 4],

    /// Drawn in order, all before the floor.
    pub notes: Vec<NoteSpec>,

    pub shaders: ShaderSources,
}

impl SceneConfig {
    pub const Z_NEAR: f32 = 0.1;
    pub const Z_FAR: f32 = 100.0;
    pub const CAMERA_Z: f32 = 0.01;
    pub const FLOOR_DEPTH: f32 = 20.0;
    pub const NOTE_POSITION: Vec3 = Vec3::new(0.0, 0.0, -3.5);
    pub const LIGHT_POS_WORLD: Vec4 = Vec4::new(0.0, 2.0, 0.0, 1.0);
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            z_near: Self::Z_NEAR,
            z_far: Self::Z_FAR,
            camera_z: Self::CAMERA_Z,
            floor_depth: Self::FLOOR_DEPTH,
            light_pos_world: Self::LIGHT_POS_WORLD,
            // Dark background so text shows up well.
            clear_color: [0.1, 0.1, 0.1, 0.5],
            notes: vec![NoteSpec::new("", Self::NOTE_POSITION)],
            shaders: ShaderSources::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let c = SceneConfig::default();
        assert_eq!(c.z_near, 0.1);
        assert_eq!(c.z_far, 100.0);
        assert_eq!(c.camera_z, 0.01);
        assert_eq!(c.floor_depth, 20.0);
        assert_eq!(c.light_pos_world, Vec4::new(0.0, 2.0, 0.0, 1.0));
        assert_eq!(c.notes, vec![NoteSpec::new("", Vec3::new(0.0, 0.0, -3.5))]);
    }

    #[test]
    fn builtin_shaders_are_present() {
        let s = ShaderSources::default();
        assert!(s.light_vertex.contains("u_MVP"));
        assert!(s.grid_fragment.contains("v_Grid"));
        assert!(s.passthrough_fragment.contains("gl_FragColor"));
    }

    #[test]
    fn missing_shader_dir_reports_path() {
        let err = ShaderSources::from_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(format!("{err:#}").contains("light_vertex.glsl"));
    }
}
