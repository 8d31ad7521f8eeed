use crate::driver::{DriverError, FrameDriver};
use driftfall_common::RandomSource;
use driftfall_render::Renderer;
use driftfall_scene::SceneContext;

/// Host capability for "call me back on the next frame".
///
/// The driver requests exactly one frame per completed tick. If it stops
/// requesting, the host stops delivering and the loop ends.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler for hosts that pump frames themselves.
///
/// Records whether a frame is pending; the host polls
/// [`take_pending`](Self::take_pending) and delivers a frame when it is set.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: u64,
}

impl ManualScheduler {
    /// Consume the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Total requests seen.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

/// Drive `driver` synchronously for up to `max_frames` frames.
///
/// Frame `n` (0-based) is stamped `n * frame_interval_ms`. Delivery ends early
/// once the driver stops requesting frames. Returns the number of frames
/// delivered.
pub fn run_frames<G, R>(
    driver: &mut FrameDriver<G>,
    scene: &mut SceneContext,
    renderer: &mut R,
    frame_interval_ms: f64,
    max_frames: u64,
) -> Result<u64, DriverError>
where
    G: RandomSource,
    R: Renderer + ?Sized,
{
    let mut scheduler = ManualScheduler::default();
    driver.start(&mut scheduler);

    let mut delivered = 0;
    while delivered < max_frames && scheduler.take_pending() {
        let time_ms = delivered as f64 * frame_interval_ms;
        driver.on_frame(time_ms, scene, renderer, &mut scheduler)?;
        delivered += 1;
    }
    tracing::debug!(delivered, requests = scheduler.requests(), "frame run finished");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfall_common::{FixedRandom, Viewport};
    use driftfall_render::DebugTextRenderer;
    use driftfall_scene::{SceneConfig, build_scene};

    #[test]
    fn manual_scheduler_tracks_requests() {
        let mut s = ManualScheduler::default();
        assert!(!s.take_pending());
        s.request_frame();
        s.request_frame();
        assert!(s.take_pending());
        assert!(!s.take_pending());
        assert_eq!(s.requests(), 2);
    }

    #[test]
    fn run_frames_delivers_requested_count() {
        let mut scene =
            build_scene(&SceneConfig::default(), Viewport::new(64, 48), &mut FixedRandom(0.5)).unwrap();
        let mut renderer = DebugTextRenderer::new(Viewport::new(64, 48));
        let mut driver = FrameDriver::new(FixedRandom(0.5));

        let delivered = run_frames(&mut driver, &mut scene, &mut renderer, 16.0, 25).unwrap();
        assert_eq!(delivered, 25);
        assert_eq!(driver.ticks(), 25);
        assert_eq!(renderer.frames(), 25);
    }

    #[test]
    fn run_frames_on_stopped_driver_delivers_nothing() {
        let mut scene =
            build_scene(&SceneConfig::default(), Viewport::new(64, 48), &mut FixedRandom(0.5)).unwrap();
        let mut renderer = DebugTextRenderer::new(Viewport::new(64, 48));
        let mut driver = FrameDriver::new(FixedRandom(0.5));
        driver.stop();

        assert_eq!(run_frames(&mut driver, &mut scene, &mut renderer, 16.0, 10).unwrap(), 0);
    }
}
