use crate::config::CameraConfig;
use driftfall_common::Object3D;
use glam::Mat4;

/// Perspective camera with a cached projection matrix.
///
/// Changing `aspect` (or any lens field) has no effect on
/// [`projection_matrix`](Self::projection_matrix) until
/// [`update_projection_matrix`](Self::update_projection_matrix) is called.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub object: Object3D,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            object: Object3D::at(config.position),
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// World-to-camera matrix. An unrotated camera looks down -Z.
    pub fn view_matrix(&self) -> Mat4 {
        self.object.matrix().inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}
