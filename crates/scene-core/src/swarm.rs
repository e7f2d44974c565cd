use crate::clock::DecayClock;
use crate::color::hsl_to_rgb;
use crate::constants::{SWARM_DAMPING, SWARM_INITIAL_SPEED, SWARM_JITTER, SWARM_RADIUS};
use glam::Vec3;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct SwarmAgent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub color: [f32; 3],
    /// Past positions, most recent first.
    pub trail: VecDeque<Vec3>,
    pub max_trail_len: usize,
}

impl SwarmAgent {
    fn record_trail(&mut self) {
        self.trail.push_front(self.position);
        self.trail.truncate(self.max_trail_len);
    }
}

/// Wandering agents with bounded motion trails.
///
/// Only constructed on entry to the swarm phase, so there is no "inactive"
/// swarm to guard against.
#[derive(Clone, Debug)]
pub struct SwarmBuffer {
    pub agents: Vec<SwarmAgent>,
    clock: DecayClock,
}

impl SwarmBuffer {
    pub fn activate<R: Rng + ?Sized>(
        count: usize,
        max_trail_len: usize,
        clock: DecayClock,
        rng: &mut R,
    ) -> Self {
        let agents = (0..count)
            .map(|_| {
                let r = rng.gen::<f32>() * SWARM_RADIUS;
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let position = Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                );
                SwarmAgent {
                    position,
                    velocity: jitter(rng, SWARM_INITIAL_SPEED),
                    acceleration: Vec3::ZERO,
                    color: hsl_to_rgb(rng.gen::<f32>(), 0.8, 0.6),
                    trail: VecDeque::with_capacity(max_trail_len + 1),
                    max_trail_len,
                }
            })
            .collect();
        Self { agents, clock }
    }

    /// One simulation step. Velocity and position integrate once per call;
    /// `dt_sec` only matters for damping under a per-second decay clock.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt_sec: f32, rng: &mut R) {
        let damping = self.clock.factor(SWARM_DAMPING, dt_sec);
        for agent in &mut self.agents {
            agent.acceleration = jitter(rng, SWARM_JITTER);
            agent.velocity += agent.acceleration;
            agent.velocity *= damping;
            agent.position += agent.velocity;
            agent.record_trail();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Total number of trail points across all agents.
    pub fn trail_points(&self) -> usize {
        self.agents.iter().map(|a| a.trail.len()).sum()
    }
}

#[inline]
fn jitter<R: Rng + ?Sized>(rng: &mut R, half_extent: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() * 2.0 - 1.0) * half_extent,
        (rng.gen::<f32>() * 2.0 - 1.0) * half_extent,
        (rng.gen::<f32>() * 2.0 - 1.0) * half_extent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn activation_places_agents_inside_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let s = SwarmBuffer::activate(500, 10, DecayClock::PerFrame, &mut rng);
        assert_eq!(s.len(), 500);
        for a in &s.agents {
            assert!(a.position.length() < SWARM_RADIUS + 1e-4);
            assert!(a.velocity.abs().max_element() <= SWARM_INITIAL_SPEED);
            assert!(a.trail.is_empty());
        }
    }

    #[test]
    fn acceleration_is_fresh_jitter_each_step() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = SwarmBuffer::activate(50, 5, DecayClock::PerFrame, &mut rng);
        for _ in 0..10 {
            s.advance(1.0 / 60.0, &mut rng);
            for a in &s.agents {
                assert!(a.acceleration.abs().max_element() <= SWARM_JITTER);
            }
        }
    }

    #[test]
    fn trail_front_is_current_position() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut s = SwarmBuffer::activate(3, 4, DecayClock::PerFrame, &mut rng);
        s.advance(0.016, &mut rng);
        let first = s.agents[0].position;
        s.advance(0.016, &mut rng);
        let a = &s.agents[0];
        assert_eq!(a.trail.len(), 2);
        assert_eq!(a.trail[0], a.position);
        assert_eq!(a.trail[1], first);
    }

    #[test]
    fn damping_bleeds_off_velocity_without_jitter_bias() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut s = SwarmBuffer::activate(1, 2, DecayClock::PerFrame, &mut rng);
        s.agents[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        s.advance(0.016, &mut rng);
        let v = s.agents[0].velocity;
        // 0.99 * (1 + j), |j| <= 0.005
        assert!(v.x <= 0.99 * 1.005 + 1e-6 && v.x >= 0.99 * 0.995 - 1e-6);
    }
}
