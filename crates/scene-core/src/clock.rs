use crate::constants::REFERENCE_FRAME_HZ;

/// How multiplicative decay/damping constants are applied.
///
/// Constants are tuned per rendered frame. `PerSecond` rescales them by the
/// frame delta against `reference_hz`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DecayClock {
    #[default]
    PerFrame,
    PerSecond { reference_hz: f32 },
}

impl DecayClock {
    pub fn per_second() -> Self {
        DecayClock::PerSecond {
            reference_hz: REFERENCE_FRAME_HZ,
        }
    }

    /// Multiplier to apply this frame for a constant tuned as `per_frame`.
    #[inline]
    pub fn factor(&self, per_frame: f32, dt_sec: f32) -> f32 {
        match *self {
            DecayClock::PerFrame => per_frame,
            DecayClock::PerSecond { reference_hz } => {
                per_frame.powf((dt_sec * reference_hz).max(0.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_per_frame() {
        assert_eq!(DecayClock::default(), DecayClock::PerFrame);
    }

    #[test]
    fn per_frame_ignores_delta() {
        let c = DecayClock::PerFrame;
        assert_eq!(c.factor(0.95, 0.001), 0.95);
        assert_eq!(c.factor(0.95, 1.0), 0.95);
    }

    #[test]
    fn per_second_matches_reference_rate() {
        let c = DecayClock::per_second();
        let one_frame = c.factor(0.95, 1.0 / 60.0);
        assert!((one_frame - 0.95).abs() < 1e-5);
        // two half-frames decay as much as one full frame
        let half = c.factor(0.95, 1.0 / 120.0);
        assert!((half * half - one_frame).abs() < 1e-5);
    }
}
