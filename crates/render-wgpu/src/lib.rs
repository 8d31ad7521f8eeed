//! wgpu render backend for driftfall.
//!
//! Draws the scene meshes with ambient plus directional lighting and linear
//! fog, then the particle cloud as camera-facing sprites.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Mesh geometry is uploaded once; only uniforms and the particle buffer
//!   change per frame.
//! - Textures are referenced by the scene but not decoded here; surfaces are
//!   shaded with their material base color.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
