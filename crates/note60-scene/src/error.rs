use std::fmt;

use note60_engine::gfx::{GraphicsError, ShaderStage};
use thiserror::Error;

/// A shader or program that did not build. Carries the driver's log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderCompileError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program `{program}` failed to link: {log}")]
    Link { program: String, log: String },

    #[error("could not create {what}: {log}")]
    Create { what: &'static str, log: String },
}

impl ShaderCompileError {
    /// Driver diagnostic text.
    pub fn log(&self) -> &str {
        match self {
            ShaderCompileError::Compile { log, .. }
            | ShaderCompileError::Link { log, .. }
            | ShaderCompileError::Create { log, .. } => log,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BindingKind {
    Attribute,
    Uniform,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Attribute => "attribute",
            BindingKind::Uniform => "uniform",
        })
    }
}

/// A name the linked program does not expose (absent or optimized out).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} `{name}` is not active in program `{program}`")]
pub struct UnknownBindingError {
    pub program: String,
    pub kind: BindingKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("{array} has {len} floats, not a multiple of {components}")]
    Ragged {
        array: &'static str,
        len: usize,
        components: usize,
    },

    #[error("vertex counts differ: {positions} positions, {normals} normals, {colors} colors")]
    CountMismatch {
        positions: usize,
        normals: usize,
        colors: usize,
    },

    #[error("geometry has no vertices")]
    Empty,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Shader(#[from] ShaderCompileError),

    #[error(transparent)]
    Binding(#[from] UnknownBindingError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error("could not allocate vertex buffer: {0}")]
    Buffer(String),
}
