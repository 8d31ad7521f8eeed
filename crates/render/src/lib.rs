//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - The particle position buffer is re-uploaded only when its version moved.
//!
//! The GPU backend lives in `driftfall-render-wgpu`; [`DebugTextRenderer`]
//! stands in for it in headless hosts and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderError, RenderSurface, Renderer};
