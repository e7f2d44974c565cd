use crate::color::hsl_to_rgb;
use crate::constants::{LIFETIME_EPSILON, PARTICLE_FADE_SECS};
use glam::Vec3;
use rand::Rng;

/// Emission parameters for the one-shot explosion burst.
#[derive(Clone, Debug)]
pub struct BurstParams {
    pub count: usize,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
}

/// Fixed-capacity struct-of-arrays particle storage.
///
/// Particles are emitted once and never removed: an expired particle keeps its
/// slot with zero opacity.
#[derive(Clone, Debug)]
pub struct ParticleBuffer {
    pub position: Vec<Vec3>,
    pub velocity: Vec<Vec3>,
    pub color: Vec<[f32; 3]>,
    pub remaining: Vec<f32>,
    pub opacity: Vec<f32>,
}

impl ParticleBuffer {
    pub fn seed<R: Rng + ?Sized>(params: &BurstParams, rng: &mut R) -> Self {
        let n = params.count;
        let mut buf = Self {
            position: vec![Vec3::ZERO; n],
            velocity: Vec::with_capacity(n),
            color: Vec::with_capacity(n),
            remaining: Vec::with_capacity(n),
            opacity: Vec::with_capacity(n),
        };
        let speed_span = params.speed_max - params.speed_min;
        let life_span = params.lifetime_max - params.lifetime_min;
        for _ in 0..n {
            let speed = params.speed_min + speed_span * rng.gen::<f32>();
            buf.velocity.push(random_unit(rng) * speed);
            buf.color.push(hsl_to_rgb(rng.gen::<f32>(), 1.0, 0.6));
            let life = params.lifetime_min + life_span * rng.gen::<f32>();
            buf.remaining.push(life);
            buf.opacity.push(fade(life));
        }
        buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn advance(&mut self, dt_sec: f32) {
        for i in 0..self.len() {
            self.position[i] += self.velocity[i] * dt_sec;
            let left = (self.remaining[i] - dt_sec).max(0.0);
            self.remaining[i] = left;
            self.opacity[i] = fade(left);
        }
    }

    /// Share of particles whose remaining lifetime is at or below `threshold`.
    pub fn fraction_expired(&self, threshold: f32) -> f32 {
        if self.is_empty() {
            return 1.0;
        }
        let n = self.remaining.iter().filter(|&&l| l <= threshold).count();
        n as f32 / self.len() as f32
    }

    pub fn all_expired(&self) -> bool {
        self.remaining.iter().all(|&l| l <= LIFETIME_EPSILON)
    }
}

#[inline]
fn fade(remaining: f32) -> f32 {
    if remaining <= LIFETIME_EPSILON {
        0.0
    } else {
        (remaining / PARTICLE_FADE_SECS).clamp(0.0, 1.0)
    }
}

/// Uniformly distributed direction on the unit sphere.
pub(crate) fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z = rng.gen::<f32>() * 2.0 - 1.0;
    let theta = rng.gen::<f32>() * std::f32::consts::TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn burst(count: usize, life: (f32, f32)) -> ParticleBuffer {
        let mut rng = StdRng::seed_from_u64(1);
        ParticleBuffer::seed(
            &BurstParams {
                count,
                lifetime_min: life.0,
                lifetime_max: life.1,
                speed_min: 1.0,
                speed_max: 2.0,
            },
            &mut rng,
        )
    }

    #[test]
    fn seeded_lifetimes_stay_in_range() {
        let p = burst(1000, (2.0, 4.0));
        assert_eq!(p.len(), 1000);
        assert!(p.remaining.iter().all(|&l| (2.0..=4.0).contains(&l)));
        assert!(p.velocity.iter().all(|v| {
            let s = v.length();
            s >= 1.0 - 1e-4 && s <= 2.0 + 1e-4
        }));
    }

    #[test]
    fn constant_velocity_integration() {
        let mut p = burst(4, (3.0, 3.0));
        let v0 = p.velocity[2];
        p.advance(0.25);
        p.advance(0.25);
        assert!((p.position[2] - v0 * 0.5).length() < 1e-5);
        assert_eq!(p.velocity[2], v0);
    }

    #[test]
    fn opacity_tracks_remaining_life() {
        let mut p = burst(3, (3.0, 3.0));
        assert_eq!(p.opacity[0], 1.0);
        p.advance(2.0); // 1s left
        assert!((p.opacity[0] - 0.5).abs() < 1e-5);
        p.advance(5.0);
        assert_eq!(p.remaining[0], 0.0);
        assert_eq!(p.opacity[0], 0.0);
        p.advance(0.1);
        assert_eq!(p.opacity[0], 0.0);
    }

    #[test]
    fn fraction_expired_counts_threshold() {
        let mut p = burst(4, (2.0, 2.0));
        p.remaining = vec![0.0, 0.4, 1.0, 3.0];
        assert_eq!(p.fraction_expired(0.0), 0.25);
        assert_eq!(p.fraction_expired(0.5), 0.5);
        assert_eq!(p.fraction_expired(5.0), 1.0);
        assert!(!p.all_expired());
    }

    #[test]
    fn random_unit_is_normalised() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert!((random_unit(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }
}
