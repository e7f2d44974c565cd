//! Scripted scene phases: Exploding → Revealed → Swarming.
//!
//! The phase is a tagged variant rather than a set of flags, so e.g. a swarm
//! can't exist while the explosion is still running: the swarm buffer lives
//! inside `Phase::Swarming`. Transitions only move forward and each fires at
//! most once.

use crate::assets::AssetPresence;
use crate::clock::DecayClock;
use crate::constants::{REVEAL_MIN_FRACTION, REVEAL_NEAR_END_LIFETIME};
use crate::particles::ParticleBuffer;
use crate::swarm::SwarmBuffer;
use rand::Rng;

/// Which asset the reveal shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealKind {
    Model,
    Image,
}

/// When the explosion counts as finished. One policy per deployment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealPolicy {
    /// Reveal the model once `min_fraction` of the particles have at most
    /// `lifetime_threshold` seconds left. Requires the model to be loaded; a
    /// failed model load keeps the scene exploding.
    NearEndFraction {
        lifetime_threshold: f32,
        min_fraction: f32,
    },
    /// Reveal the image once every particle has expired and the image is
    /// loaded; a failed image load keeps the scene exploding.
    FullCompletion,
}

impl RevealPolicy {
    pub fn near_end_fraction() -> Self {
        RevealPolicy::NearEndFraction {
            lifetime_threshold: REVEAL_NEAR_END_LIFETIME,
            min_fraction: REVEAL_MIN_FRACTION,
        }
    }

    pub fn kind(&self) -> RevealKind {
        match self {
            RevealPolicy::NearEndFraction { .. } => RevealKind::Model,
            RevealPolicy::FullCompletion => RevealKind::Image,
        }
    }

    pub fn is_met(&self, particles: &ParticleBuffer, assets: AssetPresence) -> bool {
        match *self {
            RevealPolicy::NearEndFraction {
                lifetime_threshold,
                min_fraction,
            } => {
                assets.model_ready
                    && particles.fraction_expired(lifetime_threshold) >= min_fraction
            }
            RevealPolicy::FullCompletion => assets.image_ready && particles.all_expired(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Phase {
    Exploding,
    Revealed { at_sec: f32, kind: RevealKind },
    Swarming(SwarmBuffer),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Exploding => "exploding",
            Phase::Revealed { .. } => "revealed",
            Phase::Swarming(_) => "swarming",
        }
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        matches!(self, Phase::Exploding)
    }

    pub fn swarm(&self) -> Option<&SwarmBuffer> {
        match self {
            Phase::Swarming(s) => Some(s),
            _ => None,
        }
    }

    pub fn swarm_mut(&mut self) -> Option<&mut SwarmBuffer> {
        match self {
            Phase::Swarming(s) => Some(s),
            _ => None,
        }
    }
}

/// Emitted once per transition; the front-end performs the visible side
/// effects (node visibility, caption overlay).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Revealed(RevealKind),
    SwarmStarted,
}

#[derive(Clone, Debug)]
pub struct SwarmSpec {
    pub count: usize,
    pub trail_len: usize,
    pub clock: DecayClock,
}

#[derive(Clone, Debug)]
pub struct PhaseSequencer {
    pub policy: RevealPolicy,
    pub hold_secs: f32,
    pub swarm: SwarmSpec,
    phase: Phase,
}

impl PhaseSequencer {
    pub fn new(policy: RevealPolicy, hold_secs: f32, swarm: SwarmSpec) -> Self {
        Self {
            policy,
            hold_secs,
            swarm,
            phase: Phase::Exploding,
        }
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    /// Evaluate the single allowed forward transition from the current phase.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        now_sec: f32,
        particles: &ParticleBuffer,
        assets: AssetPresence,
        rng: &mut R,
    ) -> Option<PhaseEvent> {
        match &self.phase {
            Phase::Exploding => {
                if !self.policy.is_met(particles, assets) {
                    return None;
                }
                let kind = self.policy.kind();
                self.phase = Phase::Revealed { at_sec: now_sec, kind };
                log::info!("phase: exploding -> revealed ({:?}) at {:.2}s", kind, now_sec);
                Some(PhaseEvent::Revealed(kind))
            }
            Phase::Revealed { at_sec, .. } => {
                if now_sec - at_sec < self.hold_secs {
                    return None;
                }
                let swarm = SwarmBuffer::activate(
                    self.swarm.count,
                    self.swarm.trail_len,
                    self.swarm.clock,
                    rng,
                );
                self.phase = Phase::Swarming(swarm);
                log::info!(
                    "phase: revealed -> swarming ({} agents) at {:.2}s",
                    self.swarm.count,
                    now_sec
                );
                Some(PhaseEvent::SwarmStarted)
            }
            Phase::Swarming(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::BurstParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particles(life: f32) -> ParticleBuffer {
        let mut rng = StdRng::seed_from_u64(0);
        ParticleBuffer::seed(
            &BurstParams {
                count: 100,
                lifetime_min: life,
                lifetime_max: life,
                speed_min: 1.0,
                speed_max: 1.0,
            },
            &mut rng,
        )
    }

    fn sequencer(policy: RevealPolicy) -> PhaseSequencer {
        PhaseSequencer::new(
            policy,
            1.0,
            SwarmSpec {
                count: 10,
                trail_len: 4,
                clock: DecayClock::PerFrame,
            },
        )
    }

    #[test]
    fn model_policy_waits_for_model() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seq = sequencer(RevealPolicy::near_end_fraction());
        let p = particles(0.1);
        let none = AssetPresence::default();
        assert_eq!(seq.step(0.0, &p, none, &mut rng), None);
        assert!(seq.phase().is_exploding());
        let ready = AssetPresence {
            model_ready: true,
            image_ready: false,
        };
        assert_eq!(
            seq.step(0.1, &p, ready, &mut rng),
            Some(PhaseEvent::Revealed(RevealKind::Model))
        );
    }

    const IMAGE_READY: AssetPresence = AssetPresence {
        model_ready: false,
        image_ready: true,
    };

    #[test]
    fn image_policy_needs_every_particle_expired() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seq = sequencer(RevealPolicy::FullCompletion);
        let mut p = particles(1.0);
        p.advance(0.9);
        assert_eq!(seq.step(0.9, &p, IMAGE_READY, &mut rng), None);
        p.advance(0.1);
        assert_eq!(
            seq.step(1.0, &p, IMAGE_READY, &mut rng),
            Some(PhaseEvent::Revealed(RevealKind::Image))
        );
    }

    #[test]
    fn image_policy_waits_for_image() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seq = sequencer(RevealPolicy::FullCompletion);
        let p = particles(0.0);
        let model_only = AssetPresence {
            model_ready: true,
            image_ready: false,
        };
        assert_eq!(seq.step(3.0, &p, model_only, &mut rng), None);
        assert!(seq.phase().is_exploding());
        assert_eq!(
            seq.step(3.1, &p, IMAGE_READY, &mut rng),
            Some(PhaseEvent::Revealed(RevealKind::Image))
        );
    }

    #[test]
    fn swarm_follows_after_hold_and_phase_is_terminal() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seq = sequencer(RevealPolicy::FullCompletion);
        let p = particles(0.0);
        let a = IMAGE_READY;
        assert!(seq.step(5.0, &p, a, &mut rng).is_some());
        assert_eq!(seq.step(5.5, &p, a, &mut rng), None);
        assert_eq!(seq.step(6.0, &p, a, &mut rng), Some(PhaseEvent::SwarmStarted));
        assert_eq!(seq.phase().swarm().map(|s| s.len()), Some(10));
        for t in 0..10 {
            assert_eq!(seq.step(7.0 + t as f32, &p, a, &mut rng), None);
        }
        assert_eq!(seq.phase().name(), "swarming");
    }
}
