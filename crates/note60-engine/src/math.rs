//! Matrix helpers with GL semantics.
//!
//! All matrices are `glam` column-major 4x4 floats, which is the layout GL
//! expects for `glUniformMatrix4fv(.., transpose = false, ..)`. Multiplication
//! order follows the column-vector convention: `a * b` applies `b` first.

pub use glam::{Mat4, Quat, Vec3, Vec4};

/// Builds a right-handed viewing matrix looking from `eye` toward `center`.
///
/// Equivalent to `android.opengl.Matrix.setLookAtM`.
#[inline]
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, center, up)
}

/// Returns `m` post-multiplied by a translation, i.e. the translation is
/// applied in the local frame of `m`.
#[inline]
pub fn translated(m: Mat4, t: Vec3) -> Mat4 {
    m * Mat4::from_translation(t)
}

/// Off-centre perspective projection (GL `glFrustum` semantics, depth mapped
/// to `[-1, 1]`).
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let r_width = 1.0 / (right - left);
    let r_height = 1.0 / (top - bottom);
    let r_depth = 1.0 / (near - far);

    let x = 2.0 * near * r_width;
    let y = 2.0 * near * r_height;
    let a = (right + left) * r_width;
    let b = (top + bottom) * r_height;
    let c = (far + near) * r_depth;
    let d = 2.0 * far * near * r_depth;

    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(a, b, c, -1.0),
        Vec4::new(0.0, 0.0, d, 0.0),
    )
}

/// Per-eye field of view, as half-angles in degrees measured from the eye's
/// forward axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FieldOfView {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl FieldOfView {
    #[inline]
    pub const fn symmetric(half_angle_deg: f32) -> Self {
        Self {
            left: half_angle_deg,
            right: half_angle_deg,
            bottom: half_angle_deg,
            top: half_angle_deg,
        }
    }

    /// Projection matrix for this field of view and clip range.
    pub fn perspective(&self, near: f32, far: f32) -> Mat4 {
        let l = -self.left.to_radians().tan() * near;
        let r = self.right.to_radians().tan() * near;
        let b = -self.bottom.to_radians().tan() * near;
        let t = self.top.to_radians().tan() * near;
        frustum(l, r, b, t, near, far)
    }
}

impl Default for FieldOfView {
    /// 40° on every side, the usual viewer default.
    fn default() -> Self {
        Self::symmetric(40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn translated_identity_has_translation_column() {
        let t = Vec3::new(1.5, -2.0, 7.25);
        let m = translated(Mat4::IDENTITY, t);
        assert_eq!(m.w_axis, Vec4::new(1.5, -2.0, 7.25, 1.0));
        assert_eq!(m.x_axis, Vec4::X);
        assert_eq!(m.y_axis, Vec4::Y);
        assert_eq!(m.z_axis, Vec4::Z);
    }

    #[test]
    fn translated_applies_in_local_frame() {
        let scaled = Mat4::from_scale(Vec3::splat(2.0));
        let m = translated(scaled, Vec3::new(1.0, 0.0, 0.0));
        assert!(m.w_axis.abs_diff_eq(Vec4::new(2.0, 0.0, 0.0, 1.0), EPS));
    }

    #[test]
    fn look_at_from_positive_z_is_pure_translation() {
        let m = look_at(Vec3::new(0.0, 0.0, 0.01), Vec3::ZERO, Vec3::Y);
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -0.01));
        assert!(m.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn symmetric_frustum_matches_glam_perspective() {
        let fov = FieldOfView::symmetric(40.0);
        let ours = fov.perspective(0.1, 100.0);
        let glam = Mat4::perspective_rh_gl(80f32.to_radians(), 1.0, 0.1, 100.0);
        assert!(ours.abs_diff_eq(glam, EPS));
    }

    #[test]
    fn frustum_maps_near_and_far_planes_to_ndc_bounds() {
        let p = FieldOfView::default().perspective(0.1, 100.0);

        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);

        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn asymmetric_fov_shifts_centre() {
        let fov = FieldOfView { left: 30.0, right: 50.0, bottom: 40.0, top: 40.0 };
        let p = fov.perspective(1.0, 10.0);
        // Wider right side pushes the projection centre to the right.
        assert!(p.z_axis.x > 0.0);
        assert_eq!(p.z_axis.y, 0.0);
    }
}
