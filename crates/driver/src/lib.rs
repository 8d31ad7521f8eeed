//! Frame Driver: the only active component once the scene is built.
//!
//! # Invariants
//! - One tick runs to completion, render included, before the next is requested.
//! - Animation increments are per tick, not per elapsed second.
//! - The next frame is requested only after a successful render.

pub mod driver;
pub mod scheduler;

pub use driver::{DriverError, DriverState, FrameDriver, TickReport, light_orbit, resize_to_display};
pub use scheduler::{FrameScheduler, ManualScheduler, run_frames};
