use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};

use crate::gfx::GraphicsApi;
use crate::math::FieldOfView;

use super::{Eye, EyeKind, HeadTransform, StereoRenderer, Viewport};

/// Headless host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub surface_width: u32,
    pub surface_height: u32,

    /// Number of frames to run before shutting the renderer down.
    pub frames: u64,

    /// Two side-by-side eyes when `true`, a single full-surface eye otherwise.
    pub stereo: bool,

    /// Eye separation in world units (metres).
    pub interpupillary_distance: f32,

    pub fov: FieldOfView,

    /// Simulated head turn applied each frame, in degrees about +Y.
    pub yaw_deg_per_frame: f32,

    /// Frame indices after which a trigger press is delivered.
    pub trigger_frames: Vec<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            surface_width: 1920,
            surface_height: 1080,
            frames: 120,
            stereo: true,
            interpupillary_distance: 0.064,
            fov: FieldOfView::default(),
            yaw_deg_per_frame: 0.5,
            trigger_frames: Vec::new(),
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub frames: u64,
    pub eyes_drawn: u64,
    pub triggers: u64,
    /// Head yaw of the last frame, in degrees.
    pub final_yaw_deg: f32,
}

/// Drives a [`StereoRenderer`] through its full lifecycle without a device.
///
/// Plays the part of the headset toolkit: creates the surface, delivers a
/// head transform per frame, renders each eye into its half of the surface,
/// forwards trigger presses and finally shuts the renderer down.
pub struct StereoHost {
    config: HostConfig,
}

impl StereoHost {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Whole render surface. Fails when a side is zero or does not fit a GL
    /// viewport dimension.
    pub fn surface(&self) -> Result<Viewport> {
        let (w, h) = (self.config.surface_width, self.config.surface_height);
        let width = i32::try_from(w)
            .with_context(|| format!("surface width {w} does not fit in a GL viewport"))?;
        let height = i32::try_from(h)
            .with_context(|| format!("surface height {h} does not fit in a GL viewport"))?;
        let surface = Viewport::new(0, 0, width, height);
        anyhow::ensure!(surface.is_valid(), "surface has zero size ({w}x{h})");
        Ok(surface)
    }

    pub fn yaw_deg(&self, frame: u64) -> f32 {
        self.config.yaw_deg_per_frame * frame as f32
    }

    /// Simulated head pose for `frame`.
    pub fn head_transform(&self, frame: u64) -> HeadTransform {
        HeadTransform::from_rotation(Quat::from_rotation_y(self.yaw_deg(frame).to_radians()))
    }

    /// Eyes to render for `head`, in draw order.
    pub fn eyes(&self, head: &HeadTransform) -> Result<Vec<Eye>> {
        Ok(self.split_surface(self.surface()?, head))
    }

    fn split_surface(&self, surface: Viewport, head: &HeadTransform) -> Vec<Eye> {
        if !self.config.stereo {
            return vec![Eye {
                kind: EyeKind::Monocular,
                view: head.head_view(),
                fov: self.config.fov,
                viewport: surface,
            }];
        }

        let half_ipd = self.config.interpupillary_distance * 0.5;
        let left_width = surface.width / 2;

        // The world shifts opposite to the eye's offset from the head centre.
        let left = Eye {
            kind: EyeKind::Left,
            view: Mat4::from_translation(Vec3::new(half_ipd, 0.0, 0.0)) * head.head_view(),
            fov: self.config.fov,
            viewport: Viewport::new(0, 0, left_width, surface.height),
        };
        let right = Eye {
            kind: EyeKind::Right,
            view: Mat4::from_translation(Vec3::new(-half_ipd, 0.0, 0.0)) * head.head_view(),
            fov: self.config.fov,
            viewport: Viewport::new(left_width, 0, surface.width - left_width, surface.height),
        };
        vec![left, right]
    }

    /// Runs the whole session.
    ///
    /// Fails only when the surface cannot be created or the renderer's
    /// initialization fails; per-frame problems are the renderer's to report.
    pub fn run<G, R>(&self, gfx: &mut G, renderer: &mut R) -> Result<SessionSummary>
    where
        G: GraphicsApi,
        R: StereoRenderer<G>,
    {
        let surface = self.surface()?;

        log::info!(
            "host: surface {}x{}, {} frame(s), {}",
            surface.width,
            surface.height,
            self.config.frames,
            if self.config.stereo { "stereo" } else { "monocular" }
        );

        renderer
            .on_surface_created(gfx)
            .context("renderer failed to initialize the surface")?;
        renderer.on_surface_changed(self.config.surface_width, self.config.surface_height);

        let mut summary = SessionSummary::default();

        for frame in 0..self.config.frames {
            let head = self.head_transform(frame);
            renderer.on_new_frame(gfx, &head);

            for eye in self.split_surface(surface, &head) {
                let vp = eye.viewport;
                gfx.viewport(vp.x, vp.y, vp.width, vp.height);
                renderer.on_draw_eye(gfx, &eye);
                summary.eyes_drawn += 1;
            }

            renderer.on_finish_frame(&surface);
            summary.frames += 1;
            summary.final_yaw_deg = self.yaw_deg(frame);

            if self.config.trigger_frames.contains(&frame) {
                log::debug!("host: trigger after frame {frame}");
                renderer.on_trigger();
                summary.triggers += 1;
            }
        }

        renderer.on_renderer_shutdown();
        log::info!(
            "host: session done ({} frames, {} eyes)",
            summary.frames,
            summary.eyes_drawn
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GlCall, RecordingGl};

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
        fail_init: bool,
    }

    impl StereoRenderer<RecordingGl> for Trace {
        fn on_surface_created(&mut self, _gfx: &mut RecordingGl) -> Result<()> {
            self.events.push("created".into());
            anyhow::ensure!(!self.fail_init, "no shaders");
            Ok(())
        }

        fn on_surface_changed(&mut self, width: u32, height: u32) {
            self.events.push(format!("changed {width}x{height}"));
        }

        fn on_new_frame(&mut self, _gfx: &mut RecordingGl, _head: &HeadTransform) {
            self.events.push("frame".into());
        }

        fn on_draw_eye(&mut self, _gfx: &mut RecordingGl, eye: &Eye) {
            self.events.push(format!("{:?}", eye.kind));
        }

        fn on_finish_frame(&mut self, _viewport: &Viewport) {
            self.events.push("finish".into());
        }

        fn on_renderer_shutdown(&mut self) {
            self.events.push("shutdown".into());
        }

        fn on_trigger(&mut self) {
            self.events.push("trigger".into());
        }
    }

    fn host(frames: u64, stereo: bool) -> StereoHost {
        StereoHost::new(HostConfig {
            surface_width: 100,
            surface_height: 50,
            frames,
            stereo,
            trigger_frames: vec![1],
            ..HostConfig::default()
        })
    }

    #[test]
    fn lifecycle_order() {
        let mut gl = RecordingGl::new();
        let mut r = Trace::default();
        let summary = host(2, true).run(&mut gl, &mut r).unwrap();

        assert_eq!(
            r.events,
            vec![
                "created", "changed 100x50", "frame", "Left", "Right", "finish", "frame", "Left",
                "Right", "finish", "trigger", "shutdown",
            ]
        );
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.eyes_drawn, 4);
        assert_eq!(summary.triggers, 1);
    }

    #[test]
    fn eyes_split_the_surface() {
        let h = host(1, true);
        let eyes = h.eyes(&HeadTransform::default()).unwrap();
        assert_eq!(eyes[0].viewport, Viewport::new(0, 0, 50, 50));
        assert_eq!(eyes[1].viewport, Viewport::new(50, 0, 50, 50));

        let mut gl = RecordingGl::new();
        h.run(&mut gl, &mut Trace::default()).unwrap();
        let viewports: Vec<_> = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::Viewport { .. }))
            .collect();
        assert_eq!(viewports.len(), 2);
    }

    #[test]
    fn monocular_eye_uses_head_view() {
        let h = host(1, false);
        let head = h.head_transform(10);
        let eyes = h.eyes(&head).unwrap();
        assert_eq!(eyes.len(), 1);
        assert_eq!(eyes[0].kind, EyeKind::Monocular);
        assert_eq!(eyes[0].eye_view(), head.head_view());
    }

    #[test]
    fn stereo_eyes_are_offset_symmetrically() {
        let h = host(1, true);
        let eyes = h.eyes(&HeadTransform::default()).unwrap();
        let l = eyes[0].eye_view().w_axis.x;
        let r = eyes[1].eye_view().w_axis.x;
        assert!((l + r).abs() < 1e-6);
        assert!((l - r - 0.064).abs() < 1e-6);
    }

    #[test]
    fn failed_init_stops_before_frames() {
        let mut gl = RecordingGl::new();
        let mut r = Trace {
            fail_init: true,
            ..Trace::default()
        };
        let err = host(3, true).run(&mut gl, &mut r).unwrap_err();
        assert!(format!("{err:#}").contains("no shaders"));
        assert_eq!(r.events, vec!["created"]);
    }

    #[test]
    fn zero_surface_is_rejected() {
        let h = StereoHost::new(HostConfig {
            surface_width: 0,
            ..HostConfig::default()
        });
        let mut gl = RecordingGl::new();
        let mut r = Trace::default();
        let err = h.run(&mut gl, &mut r).unwrap_err();
        assert!(err.to_string().contains("zero size"));
        assert!(r.events.is_empty());
    }

    #[test]
    fn oversized_surface_is_rejected_not_wrapped() {
        let h = StereoHost::new(HostConfig {
            surface_width: u32::MAX,
            ..HostConfig::default()
        });
        let err = h.surface().unwrap_err();
        assert!(format!("{err:#}").contains(&format!("surface width {}", u32::MAX)));
        assert!(h.eyes(&HeadTransform::default()).is_err());

        let mut gl = RecordingGl::new();
        let mut r = Trace::default();
        assert!(h.run(&mut gl, &mut r).is_err());
        assert!(r.events.is_empty());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn largest_representable_surface_is_accepted() {
        let h = StereoHost::new(HostConfig {
            surface_width: i32::MAX as u32,
            surface_height: 1,
            ..HostConfig::default()
        });
        let surface = h.surface().unwrap();
        assert_eq!(surface.width, i32::MAX);
    }
}
