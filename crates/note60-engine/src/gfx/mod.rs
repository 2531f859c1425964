//! Graphics API layer.
//!
//! This module is responsible for:
//! - the GL ES 2.0 subset the scene needs ([`GraphicsApi`])
//! - turning pending GL error codes into reportable values ([`check_error`])
//! - the explicit per-draw render context ([`RenderCtx`])
//! - backends: [`GlowBackend`] for a live context, [`RecordingGl`] for headless runs

mod api;
mod ctx;
mod error;
mod glow_backend;
mod glsl;
mod recording;

pub use api::{ErrorCode, GraphicsApi, ShaderStage, codes};
pub use ctx::RenderCtx;
pub use error::{GraphicsError, check_error, error_name};
pub use glow_backend::GlowBackend;
pub use recording::{GlCall, RecordedUniform, RecordingGl};
