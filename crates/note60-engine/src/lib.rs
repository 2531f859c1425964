//! Note60 engine crate.
//!
//! This crate owns the host contract and the GL plumbing used by the scene layer.
//! It knows nothing about notes or floors; it only provides:
//! - the stereo host callback contract and a headless host that drives it
//! - a GL ES 2.0 subset behind [`gfx::GraphicsApi`], with a `glow` backend and a
//!   recording backend for tests
//! - column-major matrix helpers matching GL conventions
//! - logger initialization

pub mod gfx;
pub mod host;
pub mod logging;
pub mod math;
