use crate::scheduler::FrameScheduler;
use driftfall_common::RandomSource;
use driftfall_render::{RenderError, RenderSurface, Renderer};
use driftfall_scene::{PerspectiveCamera, SceneContext};

/// Errors that end the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("render failed on tick {tick}: {source}")]
    Render {
        tick: u64,
        #[source]
        source: RenderError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No frame delivered yet.
    Idle,
    Running,
    /// Stopped explicitly or after a render failure. Terminal.
    Stopped,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// 1-based index of this tick.
    pub tick: u64,
    /// Host timestamp converted to seconds.
    pub seconds: f64,
    pub resized: bool,
    pub respawned: usize,
}

/// Per-frame animation loop over a [`SceneContext`].
///
/// The driver owns the random source used for particle respawns; the scene,
/// renderer and scheduler are lent to it for each frame.
#[derive(Debug)]
pub struct FrameDriver<G> {
    state: DriverState,
    rng: G,
    ticks: u64,
}

impl<G: RandomSource> FrameDriver<G> {
    pub fn new(rng: G) -> Self {
        Self {
            state: DriverState::Idle,
            rng,
            ticks: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ask the host for the first frame. Does nothing unless idle.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.state == DriverState::Idle {
            tracing::info!("frame driver starting");
            scheduler.request_frame();
        }
    }

    /// Stop requesting frames. Frames already in flight are ignored.
    pub fn stop(&mut self) {
        if self.state != DriverState::Stopped {
            tracing::info!(ticks = self.ticks, "frame driver stopped");
            self.state = DriverState::Stopped;
        }
    }

    /// Host frame callback. Runs one tick and requests the next frame.
    ///
    /// Returns `Ok(None)` when the driver is stopped. A render failure stops
    /// the driver and is returned without requesting another frame.
    pub fn on_frame<R, S>(
        &mut self,
        time_ms: f64,
        scene: &mut SceneContext,
        renderer: &mut R,
        scheduler: &mut S,
    ) -> Result<Option<TickReport>, DriverError>
    where
        R: Renderer + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        match self.state {
            DriverState::Stopped => return Ok(None),
            DriverState::Idle => self.state = DriverState::Running,
            DriverState::Running => {}
        }

        let tick = self.ticks + 1;
        let seconds = time_ms / 1000.0;

        let resized = resize_to_display(renderer, &mut scene.camera);

        let rates = scene.animation;
        scene.cube.object.rotation += rates.cube_spin;
        scene.sphere.object.rotation += rates.sphere_spin;
        let respawned = scene.particles.system.update(&mut self.rng);
        scene.particles.object.rotation += rates.cloud_spin;

        let (x, y) = light_orbit(seconds, rates.light_orbit_radius);
        scene.sun.object.position.x = x;
        scene.sun.object.position.y = y;

        if let Err(source) = renderer.render(scene) {
            tracing::error!("render failed on tick {tick}: {source}");
            self.state = DriverState::Stopped;
            return Err(DriverError::Render { tick, source });
        }

        self.ticks = tick;
        scheduler.request_frame();

        Ok(Some(TickReport {
            tick,
            seconds,
            resized,
            respawned,
        }))
    }
}

/// Match the render target to the displayed size.
///
/// Returns `true` when the target was resized, in which case the camera aspect
/// and projection have been updated too. A display with zero area is left
/// alone so the aspect never degenerates.
pub fn resize_to_display<S: RenderSurface + ?Sized>(
    surface: &mut S,
    camera: &mut PerspectiveCamera,
) -> bool {
    let shown = surface.display_size();
    if shown == surface.target_size() {
        return false;
    }
    let Some(aspect) = shown.aspect() else {
        tracing::debug!("display has zero area, skipping resize");
        return false;
    };

    surface.set_target_size(shown);
    camera.aspect = aspect;
    camera.update_projection_matrix();
    tracing::debug!(
        width = shown.width,
        height = shown.height,
        aspect,
        "render target resized"
    );
    true
}

/// Position on the light's circular path at `seconds`: `(r·cos t, r·sin t)`.
pub fn light_orbit(seconds: f64, radius: f32) -> (f32, f32) {
    let r = radius as f64;
    ((r * seconds.cos()) as f32, (r * seconds.sin()) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use driftfall_common::{FixedRandom, Viewport};
    use driftfall_render::DebugTextRenderer;
    use driftfall_scene::{CameraConfig, SceneConfig, build_scene};
    use std::f64::consts::FRAC_PI_2;

    fn scene(display: Viewport) -> SceneContext {
        build_scene(&SceneConfig::default(), display, &mut FixedRandom(0.5)).unwrap()
    }

    #[test]
    fn light_orbit_endpoints() {
        let (x, y) = light_orbit(0.0, 20.0);
        assert_eq!((x, y), (20.0, 0.0));
        let (x, y) = light_orbit(FRAC_PI_2, 20.0);
        assert!(x.abs() < 1e-5);
        assert!((y - 20.0).abs() < 1e-5);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let mut renderer = DebugTextRenderer::new(Viewport::new(1200, 600));

        assert!(resize_to_display(&mut renderer, &mut camera));
        assert_eq!(renderer.target_size(), Viewport::new(1200, 600));
        assert_eq!(camera.aspect, 2.0);
        let projection = camera.projection_matrix();

        camera.aspect = 5.0;
        assert!(!resize_to_display(&mut renderer, &mut camera));
        assert_eq!(camera.aspect, 5.0);
        assert_eq!(camera.projection_matrix(), projection);
    }

    #[test]
    fn zero_area_display_is_ignored() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.5);
        let mut renderer = DebugTextRenderer::new(Viewport::new(640, 0));
        assert!(!resize_to_display(&mut renderer, &mut camera));
        assert_eq!(renderer.target_size(), Viewport::default());
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn first_frame_moves_idle_to_running() {
        let mut driver = FrameDriver::new(FixedRandom(0.5));
        let mut scheduler = ManualScheduler::default();
        let mut scene = scene(Viewport::new(10, 10));
        let mut renderer = DebugTextRenderer::new(Viewport::new(10, 10));

        driver.start(&mut scheduler);
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(scheduler.take_pending());

        let report = driver
            .on_frame(16.0, &mut scene, &mut renderer, &mut scheduler)
            .unwrap()
            .unwrap();
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(report.tick, 1);
        assert!(report.resized);
        assert!((report.seconds - 0.016).abs() < 1e-12);
        assert!(scheduler.take_pending());
    }

    #[test]
    fn tick_applies_per_frame_increments() {
        let mut driver = FrameDriver::new(FixedRandom(0.5));
        let mut scheduler = ManualScheduler::default();
        let mut scene = scene(Viewport::new(10, 10));
        let mut renderer = DebugTextRenderer::new(Viewport::new(10, 10));

        driver
            .on_frame(0.0, &mut scene, &mut renderer, &mut scheduler)
            .unwrap();
        assert_eq!(scene.cube.object.rotation.x, 0.0);
        assert_eq!(scene.cube.object.rotation.y, 0.02);
        assert_eq!(scene.sphere.object.rotation.x, 0.02);
        assert_eq!(scene.sphere.object.rotation.y, 0.02);
        assert_eq!(scene.particles.object.rotation.y, 0.002);
        assert_eq!(scene.sun.object.position.x, 20.0);
        assert_eq!(scene.sun.object.position.y, 0.0);
        assert_eq!(scene.sun.object.position.z, 30.0);
        assert_eq!(scene.particles.system.version(), 1);
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn light_position_is_not_accumulated() {
        let mut driver = FrameDriver::new(FixedRandom(0.5));
        let mut scheduler = ManualScheduler::default();
        let mut scene = scene(Viewport::new(10, 10));
        let mut renderer = DebugTextRenderer::new(Viewport::new(10, 10));

        for time in [500.0, 9_000.0, 1_000.0 * FRAC_PI_2] {
            driver
                .on_frame(time, &mut scene, &mut renderer, &mut scheduler)
                .unwrap();
        }
        assert!(scene.sun.object.position.x.abs() < 1e-4);
        assert!((scene.sun.object.position.y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn stopped_driver_ignores_frames() {
        let mut driver = FrameDriver::new(FixedRandom(0.5));
        let mut scheduler = ManualScheduler::default();
        let mut scene = scene(Viewport::new(10, 10));
        let mut renderer = DebugTextRenderer::new(Viewport::new(10, 10));

        driver.stop();
        driver.start(&mut scheduler);
        assert!(!scheduler.take_pending());

        let out = driver
            .on_frame(0.0, &mut scene, &mut renderer, &mut scheduler)
            .unwrap();
        assert!(out.is_none());
        assert_eq!(renderer.frames(), 0);
        assert_eq!(scene.cube.object.rotation.y, 0.0);
        assert!(!scheduler.take_pending());
    }
}
