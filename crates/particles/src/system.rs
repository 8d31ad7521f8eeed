use crate::bounds::ParticleBounds;
use driftfall_common::RandomSource;
use glam::Vec3;

/// Errors from building a particle system out of existing buffers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParticleError {
    #[error("position buffer holds {positions} floats, expected 3 x {speeds} speeds")]
    BufferMismatch { positions: usize, speeds: usize },
}

/// A fixed population of particles stored as flat buffers.
///
/// Particle `i` occupies `positions[3i..3i + 3]` and `speeds[i]`. The buffers
/// are sized once and never grow or shrink.
///
/// Every `update` bumps [`version`](Self::version); renderers compare it with
/// the version they last uploaded to decide whether the position buffer is dirty.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    positions: Vec<f32>,
    speeds: Vec<f32>,
    bounds: ParticleBounds,
    version: u64,
}

impl ParticleSystem {
    /// Allocate `count` particles and scatter them through the spawn volume.
    pub fn initialize<R: RandomSource + ?Sized>(
        count: usize,
        bounds: ParticleBounds,
        rng: &mut R,
    ) -> Self {
        let mut positions = Vec::with_capacity(count * 3);
        let mut speeds = Vec::with_capacity(count);
        let extent = bounds.half_extent * 2.0;

        for _ in 0..count {
            let x = rng.next_unit() * extent - bounds.half_extent;
            let y = rng.next_unit() * bounds.spawn_span_y + bounds.spawn_min_y;
            let z = rng.next_unit() * extent - bounds.half_extent;
            positions.extend_from_slice(&[x, y, z]);
            speeds.push(rng.next_unit() * bounds.speed_span + bounds.min_speed);
        }

        tracing::debug!(count, "particle system initialized");

        Self {
            positions,
            speeds,
            bounds,
            version: 0,
        }
    }

    /// Adopt existing buffers (used for replaying a known state).
    pub fn from_buffers(
        positions: Vec<f32>,
        speeds: Vec<f32>,
        bounds: ParticleBounds,
    ) -> Result<Self, ParticleError> {
        if positions.len() != speeds.len() * 3 {
            return Err(ParticleError::BufferMismatch {
                positions: positions.len(),
                speeds: speeds.len(),
            });
        }
        Ok(Self {
            positions,
            speeds,
            bounds,
            version: 0,
        })
    }

    /// Advance every particle by one fall step.
    ///
    /// Particles that end below the floor get a fresh height in the respawn
    /// band; `x` and `z` are untouched. Returns how many particles respawned.
    pub fn update<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        let b = self.bounds;
        let mut respawned = 0;

        for (slot, &speed) in self.positions.chunks_exact_mut(3).zip(&self.speeds) {
            slot[1] -= speed;
            if slot[1] < b.floor_y {
                slot[1] = b.respawn_min_y + rng.next_unit() * b.respawn_span_y;
                respawned += 1;
            }
        }

        self.version += 1;
        if respawned > 0 {
            tracing::debug!(respawned, version = self.version, "particles respawned");
        }
        respawned
    }

    pub fn count(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Flat `[x0, y0, z0, x1, ...]` position buffer.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn speeds(&self) -> &[f32] {
        &self.speeds
    }

    pub fn bounds(&self) -> &ParticleBounds {
        &self.bounds
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions
            .get(index * 3..index * 3 + 3)
            .map(Vec3::from_slice)
    }

    /// Monotonic counter bumped whenever the position buffer changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Lowest and highest `y` across the population, `None` when empty.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.positions
            .chunks_exact(3)
            .map(|p| p[1])
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfall_common::FixedRandom;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded(count: usize, seed: u64) -> ParticleSystem {
        let mut rng = StdRng::seed_from_u64(seed);
        ParticleSystem::initialize(count, ParticleBounds::default(), &mut rng)
    }

    #[test]
    fn initialize_sizes_buffers() {
        let ps = seeded(1000, 1);
        assert_eq!(ps.count(), 1000);
        assert_eq!(ps.positions().len(), 3000);
        assert_eq!(ps.speeds().len(), 1000);
        assert_eq!(ps.version(), 0);
    }

    #[test]
    fn initialize_respects_spawn_volume() {
        let ps = seeded(1000, 2);
        for p in ps.positions().chunks_exact(3) {
            assert!((-20.0..20.0).contains(&p[0]));
            assert!((10.0..50.0).contains(&p[1]));
            assert!((-20.0..20.0).contains(&p[2]));
        }
        for &s in ps.speeds() {
            assert!((0.01..0.11).contains(&s));
        }
    }

    #[test]
    fn zero_count_is_empty() {
        let mut ps = seeded(0, 3);
        assert!(ps.is_empty());
        assert_eq!(ps.height_range(), None);
        assert_eq!(ps.update(&mut FixedRandom(0.5)), 0);
        assert_eq!(ps.version(), 1);
    }

    #[test]
    fn update_falls_by_speed() {
        let mut ps =
            ParticleSystem::from_buffers(vec![1.0, 5.0, 2.0], vec![0.25], ParticleBounds::default())
                .unwrap();
        assert_eq!(ps.update(&mut FixedRandom(0.0)), 0);
        assert_eq!(ps.positions(), &[1.0, 4.75, 2.0]);
    }

    #[test]
    fn fixed_rng_respawn_is_determined() {
        let mut ps = ParticleSystem::from_buffers(
            vec![3.0, -19.5, -4.0],
            vec![0.6],
            ParticleBounds::default(),
        )
        .unwrap();
        let r = 0.3;
        assert_eq!(ps.update(&mut FixedRandom(r)), 1);
        let p = ps.position(0).unwrap();
        assert!((p.y - (20.0 + r * 10.0)).abs() < 1e-5);
        assert_eq!(p.x, 3.0);
        assert_eq!(p.z, -4.0);
    }

    #[test]
    fn landing_exactly_on_floor_does_not_respawn() {
        let mut ps =
            ParticleSystem::from_buffers(vec![0.0, -19.5, 0.0], vec![0.5], ParticleBounds::default())
                .unwrap();
        assert_eq!(ps.update(&mut FixedRandom(0.9)), 0);
        assert_eq!(ps.position(0).unwrap().y, -20.0);
    }

    #[test]
    fn mismatched_buffers_rejected() {
        let err = ParticleSystem::from_buffers(vec![0.0; 5], vec![0.1; 2], ParticleBounds::default())
            .unwrap_err();
        assert_eq!(
            err,
            ParticleError::BufferMismatch {
                positions: 5,
                speeds: 2
            }
        );
    }

    #[test]
    fn speeds_and_horizontal_positions_never_change() {
        let mut ps = seeded(500, 4);
        let speeds = ps.speeds().to_vec();
        let xz: Vec<(f32, f32)> = ps.positions().chunks_exact(3).map(|p| (p[0], p[2])).collect();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2_000 {
            ps.update(&mut rng);
        }
        assert_eq!(ps.speeds(), speeds.as_slice());
        let after: Vec<(f32, f32)> = ps.positions().chunks_exact(3).map(|p| (p[0], p[2])).collect();
        assert_eq!(after, xz);
    }

    #[test]
    fn post_update_heights_stay_above_floor() {
        let mut ps = seeded(1000, 5);
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..3_000 {
            let before: Vec<f32> = ps.positions().chunks_exact(3).map(|p| p[1]).collect();
            ps.update(&mut rng);
            for (i, p) in ps.positions().chunks_exact(3).enumerate() {
                let y = p[1];
                let respawned = (20.0..=30.0).contains(&y) && y > before[i];
                assert!(y >= -20.0 || respawned, "particle {i} at y={y}");
            }
        }
    }

    #[test]
    fn version_bumps_every_update() {
        let mut ps = seeded(10, 7);
        let mut rng = StdRng::seed_from_u64(8);
        ps.update(&mut rng);
        ps.update(&mut rng);
        assert_eq!(ps.version(), 2);
    }

    #[test]
    fn height_range_covers_population() {
        let ps = ParticleSystem::from_buffers(
            vec![0.0, 3.0, 0.0, 0.0, -7.0, 0.0, 0.0, 12.0, 0.0],
            vec![0.1; 3],
            ParticleBounds::default(),
        )
        .unwrap();
        assert_eq!(ps.height_range(), Some((-7.0, 12.0)));
    }
}
