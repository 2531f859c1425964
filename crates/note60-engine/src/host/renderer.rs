use anyhow::Result;

use crate::gfx::GraphicsApi;

use super::{Eye, HeadTransform, Viewport};

/// Renderer contract implemented by the scene layer.
///
/// All callbacks arrive on the single render thread, strictly in lifecycle
/// order: `on_surface_created` once, `on_surface_changed`, then per frame
/// `on_new_frame`, one `on_draw_eye` per eye, `on_finish_frame`; finally
/// `on_renderer_shutdown`. `on_trigger` may arrive between frames.
pub trait StereoRenderer<G: GraphicsApi> {
    /// Allocates every GL resource. An error here is fatal: the host stops.
    fn on_surface_created(&mut self, gfx: &mut G) -> Result<()>;

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    fn on_new_frame(&mut self, gfx: &mut G, head: &HeadTransform);

    fn on_draw_eye(&mut self, gfx: &mut G, eye: &Eye);

    fn on_finish_frame(&mut self, viewport: &Viewport) {
        let _ = viewport;
    }

    fn on_renderer_shutdown(&mut self) {}

    /// The viewer pressed the headset trigger.
    fn on_trigger(&mut self) {}
}
