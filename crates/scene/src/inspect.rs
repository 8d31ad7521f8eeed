use crate::context::SceneContext;
use driftfall_common::Euler;
use glam::Vec3;

/// Read-only snapshot of the animated parts of a scene, for logs and tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub particle_count: usize,
    pub particle_version: u64,
    pub height_range: Option<(f32, f32)>,
    pub cube_rotation: Euler,
    pub sphere_rotation: Euler,
    pub cloud_rotation: Euler,
    pub light_position: Vec3,
    pub aspect: f32,
}

impl SceneSummary {
    pub fn capture(scene: &SceneContext) -> Self {
        let system = &scene.particles.system;
        Self {
            particle_count: system.count(),
            particle_version: system.version(),
            height_range: system.height_range(),
            cube_rotation: scene.cube.object.rotation,
            sphere_rotation: scene.sphere.object.rotation,
            cloud_rotation: scene.particles.object.rotation,
            light_position: scene.sun.object.position,
            aspect: scene.camera.aspect,
        }
    }
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: particles={} version={}",
            self.particle_count, self.particle_version
        )?;
        if let Some((lo, hi)) = self.height_range {
            write!(f, " y=[{lo:.2}, {hi:.2}]")?;
        }
        write!(
            f,
            " cube.y={:.3} sphere=({:.3}, {:.3}) cloud.y={:.4} light=({:.2}, {:.2}, {:.2}) aspect={:.3}",
            self.cube_rotation.y,
            self.sphere_rotation.x,
            self.sphere_rotation.y,
            self.cloud_rotation.y,
            self.light_position.x,
            self.light_position.y,
            self.light_position.z,
            self.aspect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::context::build_scene;
    use driftfall_common::{FixedRandom, Viewport};

    #[test]
    fn capture_fresh_scene() {
        let scene =
            build_scene(&SceneConfig::default(), Viewport::new(800, 600), &mut FixedRandom(0.5)).unwrap();
        let summary = SceneSummary::capture(&scene);
        assert_eq!(summary.particle_count, 1000);
        assert_eq!(summary.particle_version, 0);
        // Every particle drew 0.5, so they all start at 10 + 0.5 * 40.
        assert_eq!(summary.height_range, Some((30.0, 30.0)));
        assert_eq!(summary.cube_rotation, Euler::default());
    }

    #[test]
    fn summary_display() {
        let mut config = SceneConfig::default();
        config.particle_count = 0;
        let scene = build_scene(&config, Viewport::new(100, 100), &mut FixedRandom(0.0)).unwrap();
        let s = format!("{}", SceneSummary::capture(&scene));
        assert!(s.contains("particles=0"));
        assert!(!s.contains("y=["));
        assert!(s.contains("aspect=1.000"));
    }
}
