//! Coordinate frames supplied by the host scene.
//!
//! The generator never owns a scene graph; it only needs to move points between its
//! local space and world space, and to know where the displacement target sits.

use glam::{Affine3A, Quat, Vec3};

/// A placed coordinate frame.
pub trait Frame {
    fn to_world(&self, local: Vec3) -> Vec3;
    fn to_local(&self, world: Vec3) -> Vec3;
    /// World-space origin of the frame.
    fn position(&self) -> Vec3;
}

/// Frame backed by an affine transform and its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineFrame {
    local_to_world: Affine3A,
    world_to_local: Affine3A,
}

impl AffineFrame {
    pub fn new(local_to_world: Affine3A) -> Self {
        Self {
            local_to_world,
            world_to_local: local_to_world.inverse(),
        }
    }

    pub fn identity() -> Self {
        Self::new(Affine3A::IDENTITY)
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Affine3A::from_translation(translation))
    }

    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self::new(Affine3A::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ))
    }

    pub fn local_to_world(&self) -> Affine3A {
        self.local_to_world
    }
}

impl Default for AffineFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame for AffineFrame {
    fn to_world(&self, local: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(local)
    }

    fn to_local(&self, world: Vec3) -> Vec3 {
        self.world_to_local.transform_point3(world)
    }

    fn position(&self) -> Vec3 {
        self.local_to_world.translation.into()
    }
}
