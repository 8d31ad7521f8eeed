use driftfall_common::{Color, Object3D};
use glam::Vec3;

/// Parallel light shining from `object.position` toward `target`.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub object: Object3D,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            object: Object3D::at(position),
            target: Vec3::ZERO,
        }
    }

    /// Unit vector the light travels along. Falls back to straight down when
    /// the light sits on its target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.object.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }
}

/// Uniform light added to every surface.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}
