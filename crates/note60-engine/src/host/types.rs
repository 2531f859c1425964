use glam::{Mat4, Quat, Vec3};

use crate::math::FieldOfView;

/// Pixel rectangle of the render surface assigned to one eye.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Tracked head pose for the frame about to be drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadTransform {
    head_view: Mat4,
    rotation: Quat,
}

impl HeadTransform {
    pub fn new(head_view: Mat4, rotation: Quat) -> Self {
        Self { head_view, rotation }
    }

    /// Head pose from an orientation only (no positional tracking).
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            head_view: Mat4::from_quat(rotation.conjugate()),
            rotation,
        }
    }

    /// World-to-head transform.
    #[inline]
    pub fn head_view(&self) -> Mat4 {
        self.head_view
    }

    /// Head orientation in world space.
    #[inline]
    pub fn quaternion(&self) -> Quat {
        self.rotation
    }

    /// Direction the viewer is looking, in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for HeadTransform {
    fn default() -> Self {
        Self::from_rotation(Quat::IDENTITY)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EyeKind {
    Monocular,
    Left,
    Right,
}

/// Per-eye parameters handed to `on_draw_eye`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Eye {
    pub kind: EyeKind,
    /// Head-to-eye transform already combined with the head view.
    pub view: Mat4,
    pub fov: FieldOfView,
    pub viewport: Viewport,
}

impl Eye {
    #[inline]
    pub fn eye_view(&self) -> Mat4 {
        self.view
    }

    /// Projection for this eye's field of view.
    #[inline]
    pub fn perspective(&self, z_near: f32, z_far: f32) -> Mat4 {
        self.fov.perspective(z_near, z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_head_looks_down_negative_z() {
        let head = HeadTransform::default();
        assert_eq!(head.head_view(), Mat4::IDENTITY);
        assert!(head.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn head_view_inverts_rotation() {
        let rot = Quat::from_rotation_y(0.7);
        let head = HeadTransform::from_rotation(rot);
        let roundtrip = head.head_view() * Mat4::from_quat(rot);
        assert!(roundtrip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn zero_sized_viewport_is_invalid() {
        assert!(!Viewport::new(0, 0, 0, 10).is_valid());
        assert!(Viewport::new(0, 0, 1, 1).is_valid());
    }
}
