//! Shared types and capabilities used across the driftfall workspace.
//!
//! # Invariants
//! - Types here carry no behaviour beyond value arithmetic.
//! - Randomness is always injected through [`RandomSource`], never pulled from a global.

pub mod random;
pub mod types;

pub use random::{FixedRandom, RandomSource};
pub use types::{Color, Euler, Object3D, Viewport};
