use crate::camera::PerspectiveCamera;
use crate::config::{AnimationRates, ConfigError, SceneConfig};
use crate::geometry::Geometry;
use crate::light::{AmbientLight, DirectionalLight};
use crate::material::{PointsMaterial, Side, StandardMaterial, TextureRef};
use driftfall_common::{Color, Euler, Object3D, RandomSource, Viewport};
use driftfall_particles::ParticleSystem;
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

const CUBE_SIZE: f32 = 4.0;
const SPHERE_RADIUS: f32 = 2.0;
const GROUND_SIZE: f32 = 256.0;

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog contribution in `[0, 1]` at `distance` from the eye.
    pub fn factor(&self, distance: f32) -> f32 {
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// A drawable surface: shape, material and transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: &'static str,
    pub geometry: Geometry,
    pub material: StandardMaterial,
    pub object: Object3D,
}

/// The falling particles rendered as point sprites.
#[derive(Debug, Clone)]
pub struct ParticleCloud {
    pub system: ParticleSystem,
    pub material: PointsMaterial,
    pub object: Object3D,
}

/// Everything the frame driver animates and the renderer draws.
///
/// Built once by [`build_scene`] and then handed to the driver by reference.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub background: Color,
    pub fog: Fog,
    pub camera: PerspectiveCamera,
    pub cube: Mesh,
    pub sphere: Mesh,
    pub ground: Mesh,
    pub sun: DirectionalLight,
    pub ambient: AmbientLight,
    pub particles: ParticleCloud,
    pub animation: AnimationRates,
}

impl SceneContext {
    pub fn meshes(&self) -> [&Mesh; 3] {
        [&self.cube, &self.sphere, &self.ground]
    }
}

/// Construct the stock scene.
///
/// `surface` is the size of the output surface at startup and seeds the
/// camera aspect; an empty surface falls back to a square aspect.
pub fn build_scene<R: RandomSource + ?Sized>(
    config: &SceneConfig,
    surface: Viewport,
    rng: &mut R,
) -> Result<SceneContext, ConfigError> {
    config.validate()?;

    let camera = PerspectiveCamera::new(&config.camera, surface.aspect().unwrap_or(1.0));

    let cube = Mesh {
        name: "cube",
        geometry: Geometry::Box {
            width: CUBE_SIZE,
            height: CUBE_SIZE,
            depth: CUBE_SIZE,
        },
        material: StandardMaterial {
            map: Some(TextureRef::new("image/yaho.png")),
            ..StandardMaterial::default()
        },
        object: Object3D::at(Vec3::new(2.0, 5.0, 0.0)),
    };

    let sphere = Mesh {
        name: "sphere",
        geometry: Geometry::Sphere {
            radius: SPHERE_RADIUS,
            width_segments: 32,
            height_segments: 16,
        },
        material: StandardMaterial {
            normal_map: Some(TextureRef::new("image/yuhu.png").tiled(1.0, 1.0)),
            ..StandardMaterial::default()
        },
        object: Object3D::at(Vec3::new(-SPHERE_RADIUS - 2.0, 5.0, 0.0)),
    };

    let ground = Mesh {
        name: "ground",
        geometry: Geometry::Plane {
            width: GROUND_SIZE,
            height: GROUND_SIZE,
        },
        material: StandardMaterial {
            map: Some(TextureRef::new("image/motif.png").tiled(16.0, 16.0)),
            normal_map: Some(TextureRef::new("image/motif.png").tiled(1.0, 1.0)),
            side: Side::Double,
            ..StandardMaterial::default()
        },
        object: Object3D {
            rotation: Euler::new(-FRAC_PI_2, 0.0, 0.0),
            ..Object3D::default()
        },
    };

    let system = ParticleSystem::initialize(config.particle_count, config.particles, rng);
    let particles = ParticleCloud {
        system,
        material: PointsMaterial {
            color: Color::WHITE,
            size: 0.5,
            transparent: true,
            opacity: 0.8,
        },
        object: Object3D::default(),
    };

    tracing::info!(
        particles = config.particle_count,
        width = surface.width,
        height = surface.height,
        "scene built"
    );

    Ok(SceneContext {
        background: Color::rgb(0.9, 0.85, 0.6),
        fog: Fog {
            color: Color::WHITE,
            near: 1.0,
            far: 100.0,
        },
        camera,
        cube,
        sphere,
        ground,
        sun: DirectionalLight::new(Color::from_hex(0xededc5), 1.0, Vec3::new(5.0, 30.0, 30.0)),
        ambient: AmbientLight {
            color: Color::from_hex(0xb3b396),
            intensity: 0.3,
        },
        particles,
        animation: config.animation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Wrapping;
    use driftfall_common::FixedRandom;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stock() -> SceneContext {
        let mut rng = StdRng::seed_from_u64(3);
        build_scene(&SceneConfig::default(), Viewport::new(1280, 720), &mut rng).unwrap()
    }

    #[test]
    fn builds_stock_layout() {
        let scene = stock();
        assert_eq!(scene.cube.object.position, Vec3::new(2.0, 5.0, 0.0));
        assert_eq!(scene.sphere.object.position, Vec3::new(-4.0, 5.0, 0.0));
        assert_eq!(scene.ground.object.rotation.x, -FRAC_PI_2);
        assert_eq!(scene.ground.material.side, Side::Double);
        assert_eq!(scene.particles.system.count(), 1000);
        assert_eq!(scene.sun.object.position, Vec3::new(5.0, 30.0, 30.0));
        assert_eq!(scene.ambient.intensity, 0.3);
        assert!((scene.camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn ground_texture_tiles() {
        let scene = stock();
        let map = scene.ground.material.map.as_ref().unwrap();
        assert_eq!(map.wrap_s, Wrapping::Repeat);
        assert_eq!(map.repeat.x, 16.0);
    }

    #[test]
    fn particle_cloud_material() {
        let scene = stock();
        let m = scene.particles.material;
        assert_eq!(m.size, 0.5);
        assert!(m.transparent);
        assert_eq!(m.opacity, 0.8);
    }

    #[test]
    fn empty_surface_gets_square_aspect() {
        let scene =
            build_scene(&SceneConfig::default(), Viewport::new(0, 0), &mut FixedRandom(0.5)).unwrap();
        assert_eq!(scene.camera.aspect, 1.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.camera.far = 0.0;
        let result = build_scene(&config, Viewport::new(10, 10), &mut FixedRandom(0.5));
        assert!(matches!(result, Err(ConfigError::Camera(_))));
    }

    #[test]
    fn huge_particle_count_fails_before_allocating() {
        let mut config = SceneConfig::default();
        config.particle_count = usize::MAX / 2;
        let result = build_scene(&config, Viewport::new(10, 10), &mut FixedRandom(0.5));
        assert!(matches!(result, Err(ConfigError::TooManyParticles { .. })));
    }

    #[test]
    fn fog_factor_ramps_linearly() {
        let scene = stock();
        assert_eq!(scene.fog.factor(0.0), 0.0);
        assert!((scene.fog.factor(50.5) - 0.5).abs() < 1e-6);
        assert_eq!(scene.fog.factor(500.0), 1.0);
    }

    #[test]
    fn meshes_lists_all_surfaces() {
        let scene = stock();
        let names: Vec<&str> = scene.meshes().iter().map(|m| m.name).collect();
        assert_eq!(names, ["cube", "sphere", "ground"]);
    }
}
