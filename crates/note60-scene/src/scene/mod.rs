//! Placed, drawable scene content.

mod hook;
mod object;
mod world;

pub use hook::OrientationHook;
pub use object::{ObjectKind, ObjectTransforms, SceneObject};
pub use world::Scene;
