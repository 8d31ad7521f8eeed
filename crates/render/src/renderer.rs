use driftfall_common::Viewport;
use driftfall_scene::{SceneContext, SceneSummary};

/// Failures a backend can report from a draw call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Sizing half of a render backend.
///
/// `display_size` is what the host currently shows; `target_size` is what the
/// backend draws into. They drift apart whenever the host resizes the output.
pub trait RenderSurface {
    fn display_size(&self) -> Viewport;
    fn target_size(&self) -> Viewport;
    /// Resize the render target to exactly `size` pixels.
    fn set_target_size(&mut self, size: Viewport);
}

/// Renderer-agnostic interface. All backends implement this trait.
pub trait Renderer: RenderSurface {
    /// Draw one frame of `scene` through its camera.
    fn render(&mut self, scene: &SceneContext) -> Result<(), RenderError>;
}

/// Headless backend that describes each frame as text.
///
/// Tracks target resizes and particle buffer uploads the way a GPU backend
/// would, which makes it the reference fake for driver tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    display: Viewport,
    target: Viewport,
    frames: u64,
    uploads: u64,
    uploaded_version: Option<u64>,
    last_frame: String,
}

impl DebugTextRenderer {
    /// A renderer whose host displays `display`; the target starts unsized.
    pub fn new(display: Viewport) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// Simulate the host changing the displayed size.
    pub fn set_display_size(&mut self, size: Viewport) {
        self.display = size;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of times the particle buffer was (re)uploaded.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }
}

impl RenderSurface for DebugTextRenderer {
    fn display_size(&self) -> Viewport {
        self.display
    }

    fn target_size(&self) -> Viewport {
        self.target
    }

    fn set_target_size(&mut self, size: Viewport) {
        self.target = size;
    }
}

impl Renderer for DebugTextRenderer {
    fn render(&mut self, scene: &SceneContext) -> Result<(), RenderError> {
        let version = scene.particles.system.version();
        if self.uploaded_version != Some(version) {
            self.uploaded_version = Some(version);
            self.uploads += 1;
            tracing::trace!(version, "particle buffer uploaded");
        }
        self.frames += 1;

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{}) ===\n",
            self.frames, self.target.width, self.target.height
        ));
        let eye = scene.camera.object.position;
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}\n",
            eye.x, eye.y, eye.z, scene.camera.fov_degrees, scene.camera.aspect
        ));
        for mesh in scene.meshes() {
            let p = mesh.object.position;
            let r = mesh.object.rotation;
            out.push_str(&format!(
                "  [{}] pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3})\n",
                mesh.name, p.x, p.y, p.z, r.x, r.y, r.z
            ));
        }
        out.push_str(&format!("{}\n", SceneSummary::capture(scene)));

        self.last_frame = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfall_common::FixedRandom;
    use driftfall_scene::{SceneConfig, build_scene};

    fn scene() -> SceneContext {
        build_scene(&SceneConfig::default(), Viewport::new(640, 480), &mut FixedRandom(0.5)).unwrap()
    }

    #[test]
    fn debug_renderer_describes_scene() {
        let mut renderer = DebugTextRenderer::new(Viewport::new(640, 480));
        renderer.set_target_size(Viewport::new(640, 480));
        renderer.render(&scene()).unwrap();

        let output = renderer.last_frame();
        assert!(output.contains("Frame 1 (640x480)"));
        assert!(output.contains("[cube]"));
        assert!(output.contains("[ground]"));
        assert!(output.contains("particles=1000"));
    }

    #[test]
    fn uploads_only_when_version_moves() {
        let mut scene = scene();
        let mut renderer = DebugTextRenderer::new(Viewport::new(1, 1));
        renderer.render(&scene).unwrap();
        renderer.render(&scene).unwrap();
        assert_eq!(renderer.uploads(), 1);

        scene.particles.system.update(&mut FixedRandom(0.5));
        renderer.render(&scene).unwrap();
        assert_eq!(renderer.uploads(), 2);
        assert_eq!(renderer.frames(), 3);
    }

    #[test]
    fn target_tracks_requests_not_display() {
        let mut renderer = DebugTextRenderer::new(Viewport::new(300, 200));
        assert_eq!(renderer.target_size(), Viewport::default());
        renderer.set_display_size(Viewport::new(400, 200));
        assert_eq!(renderer.target_size(), Viewport::default());
        renderer.set_target_size(Viewport::new(400, 200));
        assert_eq!(renderer.target_size(), renderer.display_size());
    }
}
