//! Note60 scene.
//!
//! A floor grid and one or more note quads, lit from a fixed point above the
//! viewer and rendered once per eye through the engine's host contract.
//!
//! Layering, leaves first:
//! - [`geometry`]: immutable per-vertex arrays and their GL upload
//! - [`shader`]: compile/link with structured diagnostics, binding lookup
//! - [`scene`]: placed objects that draw themselves from a render context
//! - [`renderer`]: the per-frame camera/eye/light composition

pub mod config;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod shader;

pub use config::{NoteSpec, SceneConfig, ShaderSources};
pub use error::{BindingKind, GeometryError, SceneError, ShaderCompileError, UnknownBindingError};
pub use renderer::{EyeFrame, FrameRenderer, FrameReport};
