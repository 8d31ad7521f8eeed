use driftfall_common::Euler;
use driftfall_particles::{BoundsError, ParticleBounds};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid particle bounds: {0}")]
    Bounds(#[from] BoundsError),
    #[error("invalid camera: {0}")]
    Camera(&'static str),
    #[error("particle count {count} exceeds the limit of {max}")]
    TooManyParticles { count: usize, max: usize },
    #[error("animation value `{0}` is not finite")]
    Animation(&'static str),
}

/// Largest particle population a config may request.
pub const MAX_PARTICLES: usize = 10_000_000;

/// Per-tick increments applied by the frame driver.
///
/// These are deliberately per frame, not per second: animation speed follows
/// the host's frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationRates {
    pub cube_spin: Euler,
    pub sphere_spin: Euler,
    pub cloud_spin: Euler,
    /// Radius of the circle the directional light follows in the XY plane.
    pub light_orbit_radius: f32,
}

impl Default for AnimationRates {
    fn default() -> Self {
        Self {
            cube_spin: Euler::new(0.0, 0.02, 0.0),
            sphere_spin: Euler::new(0.02, 0.02, 0.0),
            cloud_spin: Euler::new(0.0, 0.002, 0.0),
            light_orbit_radius: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 5.0, 25.0),
        }
    }
}

/// Tunable scene parameters. Defaults reproduce the stock scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: usize,
    pub particles: ParticleBounds,
    pub animation: AnimationRates,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            particles: ParticleBounds::default(),
            animation: AnimationRates::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count > MAX_PARTICLES {
            return Err(ConfigError::TooManyParticles {
                count: self.particle_count,
                max: MAX_PARTICLES,
            });
        }
        self.particles.validate()?;

        let cam = &self.camera;
        if !(cam.fov_degrees.is_finite() && cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Camera("fov_degrees must lie in (0, 180)"));
        }
        if !(cam.near.is_finite() && cam.near > 0.0) {
            return Err(ConfigError::Camera("near must be positive"));
        }
        if !(cam.far.is_finite() && cam.far > cam.near) {
            return Err(ConfigError::Camera("far must exceed near"));
        }
        if !cam.position.is_finite() {
            return Err(ConfigError::Camera("position must be finite"));
        }

        let anim = &self.animation;
        for (name, spin) in [
            ("cube_spin", anim.cube_spin),
            ("sphere_spin", anim.sphere_spin),
            ("cloud_spin", anim.cloud_spin),
        ] {
            if !(spin.x.is_finite() && spin.y.is_finite() && spin.z.is_finite()) {
                return Err(ConfigError::Animation(name));
            }
        }
        if !anim.light_orbit_radius.is_finite() {
            return Err(ConfigError::Animation("light_orbit_radius"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_stock_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.particle_count, 1000);
        assert_eq!(c.animation.cube_spin, Euler::new(0.0, 0.02, 0.0));
        assert_eq!(c.animation.sphere_spin, Euler::new(0.02, 0.02, 0.0));
        assert_eq!(c.animation.cloud_spin.y, 0.002);
        assert_eq!(c.camera.fov_degrees, 55.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SceneConfig::from_json_str(r#"{ "particle_count": 250, "camera": { "fov_degrees": 70.0 } }"#)
            .unwrap();
        assert_eq!(c.particle_count, 250);
        assert_eq!(c.camera.fov_degrees, 70.0);
        assert_eq!(c.camera.near, 0.1);
        assert_eq!(c.particles, ParticleBounds::default());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut c = SceneConfig::default();
        c.animation.light_orbit_radius = 12.5;
        let json = c.to_json_pretty().unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), c);
    }

    #[test]
    fn rejects_bad_camera() {
        let err = SceneConfig::from_json_str(r#"{ "camera": { "near": 5.0, "far": 1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Camera(_)));
    }

    #[test]
    fn rejects_bad_bounds() {
        let err = SceneConfig::from_json_str(r#"{ "particles": { "speed_span": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Bounds(BoundsError::Negative("speed_span"))));
    }

    #[test]
    fn rejects_oversized_population() {
        let mut c = SceneConfig::default();
        c.particle_count = MAX_PARTICLES;
        assert!(c.validate().is_ok());

        c.particle_count = usize::MAX;
        let err = c.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyParticles {
                count: usize::MAX,
                max: MAX_PARTICLES
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SceneConfig::from_json_str("{ particle_count: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "particle_count": 42 }}"#).unwrap();
        let c = SceneConfig::from_json_file(file.path()).unwrap();
        assert_eq!(c.particle_count, 42);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
