//! Host-facing contracts.
//!
//! A VR host toolkit owns the render thread and calls into a
//! [`StereoRenderer`] at fixed points of its lifecycle. This module defines
//! that contract, the per-frame values the host hands over, and
//! [`StereoHost`], a headless host used by tools and tests.

mod renderer;
mod runtime;
mod types;

pub use renderer::StereoRenderer;
pub use runtime::{HostConfig, SessionSummary, StereoHost};
pub use types::{Eye, EyeKind, HeadTransform, Viewport};
