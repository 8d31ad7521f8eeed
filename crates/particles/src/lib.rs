//! Particle System: a fixed population of falling particles that recycle at the floor.
//!
//! # Invariants
//! - Particle count is fixed at construction; particles are never destroyed.
//! - `update` only ever writes the `y` slot of a particle.
//! - Fall speeds are drawn once and never change.

pub mod bounds;
pub mod system;

pub use bounds::{BoundsError, ParticleBounds};
pub use system::{ParticleError, ParticleSystem};
