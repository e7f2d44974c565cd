use crate::clock::DecayClock;
use crate::constants::{BEAT_DECAY, BEAT_INTERVAL_MS};

/// Synthetic metronome standing in for audio beat detection.
///
/// Fires a full-intensity pulse whenever at least one interval has passed
/// since the previous pulse and decays geometrically in between. No audio is
/// consumed.
#[derive(Clone, Debug)]
pub struct BeatEstimator {
    interval_ms: f64,
    last_beat_ms: Option<f64>,
    last_tick_sec: Option<f64>,
    intensity: f32,
    clock: DecayClock,
}

impl Default for BeatEstimator {
    fn default() -> Self {
        Self::new(BEAT_INTERVAL_MS, DecayClock::PerFrame)
    }
}

impl BeatEstimator {
    pub fn new(interval_ms: f64, clock: DecayClock) -> Self {
        Self {
            interval_ms,
            last_beat_ms: None,
            last_tick_sec: None,
            intensity: 0.0,
            clock,
        }
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn tick(&mut self, elapsed_sec: f64) -> f32 {
        let now_ms = elapsed_sec * 1000.0;
        let due = match self.last_beat_ms {
            None => true,
            Some(last) => now_ms - last >= self.interval_ms,
        };
        if due {
            self.intensity = 1.0;
            self.last_beat_ms = Some(now_ms);
        } else {
            let dt = self
                .last_tick_sec
                .map(|prev| (elapsed_sec - prev).max(0.0) as f32)
                .unwrap_or(0.0);
            self.intensity *= self.clock.factor(BEAT_DECAY, dt);
        }
        self.last_tick_sec = Some(elapsed_sec);
        self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_a_beat() {
        let mut b = BeatEstimator::default();
        assert_eq!(b.tick(3.7), 1.0);
    }

    #[test]
    fn decays_by_fixed_factor_between_beats() {
        let mut b = BeatEstimator::default();
        b.tick(0.0);
        let a = b.tick(0.1);
        let c = b.tick(0.2);
        assert!((a - 0.95).abs() < 1e-6);
        assert!((c - 0.95 * 0.95).abs() < 1e-6);
        assert!(c < a);
    }

    #[test]
    fn reset_happens_exactly_on_interval() {
        let mut b = BeatEstimator::default();
        b.tick(1.0);
        assert!(b.tick(1.499) < 1.0);
        assert_eq!(b.tick(1.5), 1.0);
    }
}
