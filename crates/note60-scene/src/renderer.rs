//! Per-frame composition of camera, eye and light, and the draw loop.

use anyhow::Result;
use glam::{Mat4, Quat, Vec3, Vec4};
use note60_engine::gfx::{GraphicsApi, GraphicsError, RenderCtx, check_error};
use note60_engine::host::{Eye, HeadTransform, StereoRenderer, Viewport};
use note60_engine::math::look_at;

use crate::config::{NoteSpec, SceneConfig};
use crate::error::SceneError;
use crate::scene::Scene;

/// View, projection and eye-space light for one eye.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeFrame {
    pub view: Mat4,
    pub projection: Mat4,
    pub light_pos_eye: Vec4,
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub eyes: u32,
    pub draws: u32,
    pub vertices: u64,
    /// Eyes whose remaining draws were abandoned after an error.
    pub skipped_eyes: u32,
    pub errors: Vec<GraphicsError>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.skipped_eyes == 0
    }
}

/// Renders the note scene through the host's lifecycle callbacks.
///
/// Initialization failures are returned to the host and end the session.
/// Graphics errors during a frame are logged and recorded in that frame's
/// [`FrameReport`]; the affected eye draws nothing further and the session
/// carries on.
pub struct FrameRenderer<G: GraphicsApi> {
    config: SceneConfig,
    scene: Option<Scene<G>>,

    camera: Mat4,
    head_view: Mat4,
    head_rotation: Quat,
    surface_size: (u32, u32),

    frame: u64,
    current: FrameReport,
    last: Option<FrameReport>,
    total_errors: u64,
    triggers: u64,
}

impl<G: GraphicsApi> FrameRenderer<G> {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            scene: None,
            camera: Mat4::IDENTITY,
            head_view: Mat4::IDENTITY,
            head_rotation: Quat::IDENTITY,
            surface_size: (0, 0),
            frame: 0,
            current: FrameReport::default(),
            last: None,
            total_errors: 0,
            triggers: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// `None` until the surface has been created.
    pub fn scene(&self) -> Option<&Scene<G>> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene<G>> {
        self.scene.as_mut()
    }

    /// Adds a note to a live scene.
    pub fn add_note(&mut self, gfx: &mut G, spec: &NoteSpec) -> Result<usize, SceneError> {
        match self.scene.as_mut() {
            Some(scene) => scene.add_note(gfx, spec),
            None => {
                self.config.notes.push(spec.clone());
                Ok(self.config.notes.len() - 1)
            }
        }
    }

    pub fn camera(&self) -> Mat4 {
        self.camera
    }

    pub fn head_view(&self) -> Mat4 {
        self.head_view
    }

    /// Head orientation of the current frame. Stored, not applied.
    pub fn head_rotation(&self) -> Quat {
        self.head_rotation
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn frames_finished(&self) -> u64 {
        self.frame
    }

    /// Report of the frame in progress.
    pub fn current_report(&self) -> &FrameReport {
        &self.current
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last.as_ref()
    }

    /// Graphics errors recorded over all finished frames.
    pub fn total_errors(&self) -> u64 {
        self.total_errors
    }

    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Combines `eye` with the current camera.
    pub fn compose_eye(&self, eye: &Eye) -> EyeFrame {
        let view = eye.eye_view() * self.camera;
        EyeFrame {
            view,
            projection: eye.perspective(self.config.z_near, self.config.z_far),
            light_pos_eye: view * self.config.light_pos_world,
        }
    }

    fn record(&mut self, error: GraphicsError) {
        log::warn!("frame {}: {error}", self.frame);
        self.current.errors.push(error);
    }
}

impl<G: GraphicsApi> StereoRenderer<G> for FrameRenderer<G> {
    fn on_surface_created(&mut self, gfx: &mut G) -> Result<()> {
        log::info!("onSurfaceCreated");
        gfx.clear_color(self.config.clear_color);

        let scene = Scene::build(gfx, &self.config)?;
        self.scene = Some(scene);

        check_error(gfx, "onSurfaceCreated")?;
        Ok(())
    }

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        log::info!("onSurfaceChanged {width}x{height}");
        self.surface_size = (width, height);
    }

    fn on_new_frame(&mut self, gfx: &mut G, head: &HeadTransform) {
        self.current = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        self.camera = look_at(
            Vec3::new(0.0, 0.0, self.config.camera_z),
            Vec3::ZERO,
            Vec3::Y,
        );
        self.head_view = head.head_view();
        self.head_rotation = head.quaternion();
        log::trace!("frame {}: head {:?}", self.frame, self.head_rotation);

        if let Err(e) = check_error(gfx, "onReadyToDraw") {
            self.record(e);
        }
    }

    fn on_draw_eye(&mut self, gfx: &mut G, eye: &Eye) {
        let frame = self.compose_eye(eye);
        self.current.eyes += 1;

        if self.scene.is_none() {
            log::warn!("{:?} eye requested before the surface was created", eye.kind);
            self.current.skipped_eyes += 1;
            return;
        }

        gfx.enable_depth_test();
        gfx.clear(true, true);
        if let Err(e) = check_error(gfx, "colorParam") {
            self.record(e);
            self.current.skipped_eyes += 1;
            return;
        }

        let mut failure = None;
        if let Some(scene) = &self.scene {
            let mut ctx = RenderCtx::new(gfx, frame.view, frame.projection, frame.light_pos_eye);
            for object in scene.draw_order() {
                match object.draw(&mut ctx) {
                    Ok(vertices) => {
                        self.current.draws += 1;
                        self.current.vertices += vertices as u64;
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        if let Some(e) = failure {
            log::warn!("skipping rest of {:?} eye", eye.kind);
            self.record(e);
            self.current.skipped_eyes += 1;
        }
    }

    fn on_finish_frame(&mut self, _viewport: &Viewport) {
        let report = std::mem::take(&mut self.current);
        log::debug!(
            "frame {}: {} draw(s), {} error(s)",
            report.frame,
            report.draws,
            report.errors.len()
        );
        self.total_errors += report.errors.len() as u64;
        self.last = Some(report);
        self.frame += 1;
    }

    fn on_renderer_shutdown(&mut self) {
        log::info!(
            "onRendererShutdown after {} frame(s), {} graphics error(s)",
            self.frame,
            self.total_errors
        );
    }

    fn on_trigger(&mut self) {
        self.triggers += 1;
        log::info!("onCardboardTrigger ({})", self.triggers);
    }
}
