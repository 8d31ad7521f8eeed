use serde::{Deserialize, Serialize};

/// Spawn volume, floor, respawn band and speed range for a particle population.
///
/// Every range is expressed as `min + sample * span` with `sample` in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleBounds {
    /// `x` and `z` are drawn from `[-half_extent, half_extent)`.
    pub half_extent: f32,
    pub spawn_min_y: f32,
    pub spawn_span_y: f32,
    /// A particle whose `y` drops below this is respawned.
    pub floor_y: f32,
    pub respawn_min_y: f32,
    pub respawn_span_y: f32,
    pub min_speed: f32,
    pub speed_span: f32,
}

impl Default for ParticleBounds {
    fn default() -> Self {
        Self {
            half_extent: 20.0,
            spawn_min_y: 10.0,
            spawn_span_y: 40.0,
            floor_y: -20.0,
            respawn_min_y: 20.0,
            respawn_span_y: 10.0,
            min_speed: 0.01,
            speed_span: 0.1,
        }
    }
}

/// Rejected bounds.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BoundsError {
    #[error("bound `{0}` is not finite")]
    NotFinite(&'static str),
    #[error("bound `{0}` must not be negative")]
    Negative(&'static str),
    #[error("respawn band starts at {respawn_min_y}, at or below the floor {floor_y}")]
    RespawnBelowFloor { respawn_min_y: f32, floor_y: f32 },
}

impl ParticleBounds {
    /// Largest distance a particle can fall in one update.
    pub fn max_speed(&self) -> f32 {
        self.min_speed + self.speed_span
    }

    pub fn validate(&self) -> Result<(), BoundsError> {
        let fields = [
            ("half_extent", self.half_extent),
            ("spawn_min_y", self.spawn_min_y),
            ("spawn_span_y", self.spawn_span_y),
            ("floor_y", self.floor_y),
            ("respawn_min_y", self.respawn_min_y),
            ("respawn_span_y", self.respawn_span_y),
            ("min_speed", self.min_speed),
            ("speed_span", self.speed_span),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(BoundsError::NotFinite(name));
            }
        }
        for (name, value) in [
            ("half_extent", self.half_extent),
            ("spawn_span_y", self.spawn_span_y),
            ("respawn_span_y", self.respawn_span_y),
            ("min_speed", self.min_speed),
            ("speed_span", self.speed_span),
        ] {
            if value < 0.0 {
                return Err(BoundsError::Negative(name));
            }
        }
        if self.respawn_min_y <= self.floor_y {
            return Err(BoundsError::RespawnBelowFloor {
                respawn_min_y: self.respawn_min_y,
                floor_y: self.floor_y,
            });
        }
        Ok(())
    }
}
