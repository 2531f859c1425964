use glam::{Mat4, Vec3};

/// Optional rotation applied after an object's translation.
///
/// Objects are placed by translation only unless a hook is installed. The
/// hook receives the object's world position and returns the rotation (or
/// any local transform) to post-multiply onto the model matrix.
pub trait OrientationHook {
    fn orientation(&self, position: Vec3) -> Mat4;
}

impl<F> OrientationHook for F
where
    F: Fn(Vec3) -> Mat4,
{
    fn orientation(&self, position: Vec3) -> Mat4 {
        self(position)
    }
}
