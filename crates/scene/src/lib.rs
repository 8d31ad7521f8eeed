//! Scene Graph Builder: everything constructed once before the first frame.
//!
//! # Invariants
//! - `build_scene` is the only way a [`SceneContext`] comes into existence.
//! - Setup never runs again after the frame loop starts; per-frame mutation
//!   belongs to the driver.

pub mod camera;
pub mod config;
pub mod context;
pub mod geometry;
pub mod inspect;
pub mod light;
pub mod material;

pub use camera::PerspectiveCamera;
pub use config::{AnimationRates, CameraConfig, ConfigError, MAX_PARTICLES, SceneConfig};
pub use context::{Fog, Mesh, ParticleCloud, SceneContext, build_scene};
pub use geometry::{Geometry, MeshData};
pub use inspect::SceneSummary;
pub use light::{AmbientLight, DirectionalLight};
pub use material::{PointsMaterial, Side, StandardMaterial, TextureRef, Wrapping};
