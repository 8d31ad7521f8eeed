use driftfall_common::Color;
use glam::Vec2;

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapping {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Which faces of a mesh are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Reference to an image on disk plus its sampling settings.
///
/// Decoding is left to the renderer; the scene only records what to load.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub path: String,
    pub wrap_s: Wrapping,
    pub wrap_t: Wrapping,
    pub repeat: Vec2,
}

impl TextureRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            wrap_s: Wrapping::ClampToEdge,
            wrap_t: Wrapping::ClampToEdge,
            repeat: Vec2::ONE,
        }
    }

    /// Repeat in both directions, tiling `u` by `v` times across the surface.
    pub fn tiled(mut self, u: f32, v: f32) -> Self {
        self.wrap_s = Wrapping::Repeat;
        self.wrap_t = Wrapping::Repeat;
        self.repeat = Vec2::new(u, v);
        self
    }
}

/// Physically based surface material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandardMaterial {
    pub color: Color,
    pub map: Option<TextureRef>,
    pub normal_map: Option<TextureRef>,
    pub side: Side,
}

/// Material for point sprites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    /// Sprite size in world units.
    pub size: f32,
    pub transparent: bool,
    pub opacity: f32,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size: 1.0,
            transparent: false,
            opacity: 1.0,
        }
    }
}
