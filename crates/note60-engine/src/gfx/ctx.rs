use glam::{Mat4, Vec4};

use super::GraphicsApi;

/// Renderer-facing context for one eye.
///
/// Draw calls receive this instead of reaching for ambient GL state, so the
/// inputs of every draw are visible at the call site. The graphics API itself
/// still carries global binding state between draws.
pub struct RenderCtx<'a, G: GraphicsApi> {
    pub gfx: &'a mut G,
    pub view: Mat4,
    pub projection: Mat4,
    /// Light position after the view transform (w = 1).
    pub light_pos_eye: Vec4,
}

impl<'a, G: GraphicsApi> RenderCtx<'a, G> {
    #[inline]
    pub fn new(gfx: &'a mut G, view: Mat4, projection: Mat4, light_pos_eye: Vec4) -> Self {
        Self {
            gfx,
            view,
            projection,
            light_pos_eye,
        }
    }
}
