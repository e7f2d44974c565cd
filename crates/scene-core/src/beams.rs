use crate::color::hsl_to_rgb;
use crate::constants::*;
use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;

/// Immutable per-beam configuration.
#[derive(Clone, Debug)]
pub struct LightBeam {
    pub hue: f32,
    pub base_intensity: f32,
    pub rotation_speed: f32,
    pub phase_offset: f32,
    pub pulse_phase: f32,
}

/// Per-frame derived spotlight state. Recomputed every frame, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamFrame {
    pub position: Vec3,
    pub target: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    /// Cone half-angle in radians.
    pub aperture: f32,
}

pub type BeamFrames = SmallVec<[BeamFrame; BEAM_COUNT]>;

#[derive(Clone, Debug)]
pub struct BeamRig {
    pub beams: Vec<LightBeam>,
}

impl Default for BeamRig {
    fn default() -> Self {
        Self::evenly_spaced(BEAM_COUNT)
    }
}

impl BeamRig {
    /// Beams spread evenly around the circle and the colour wheel.
    pub fn evenly_spaced(count: usize) -> Self {
        let n = count.max(1) as f32;
        let beams = (0..count)
            .map(|i| {
                let f = i as f32 / n;
                LightBeam {
                    hue: f,
                    base_intensity: BEAM_BASE_INTENSITY,
                    rotation_speed: 0.5 + 0.1 * i as f32,
                    phase_offset: f * std::f32::consts::TAU,
                    pulse_phase: i as f32 * 0.7,
                }
            })
            .collect();
        Self { beams }
    }

    pub fn advance<R: Rng + ?Sized>(&self, elapsed_sec: f32, beat: f32, rng: &mut R) -> BeamFrames {
        self.beams
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let idx = i as f32;
                let angle = b.phase_offset + elapsed_sec * b.rotation_speed;
                let position = Vec3::new(
                    angle.cos() * BEAM_RADIUS,
                    BEAM_HEIGHT,
                    angle.sin() * BEAM_RADIUS,
                );
                let target = Vec3::new(
                    BEAM_AIM_WOBBLE * (elapsed_sec + idx).sin(),
                    0.0,
                    BEAM_AIM_WOBBLE * (elapsed_sec + idx).cos(),
                );
                let strobe = if rng.gen::<f32>() < BEAM_STROBE_CHANCE {
                    BEAM_STROBE_GAIN
                } else {
                    1.0
                };
                let pulse = 0.5 + 0.5 * (2.0 * elapsed_sec + b.pulse_phase).sin();
                BeamFrame {
                    position,
                    target,
                    color: hsl_to_rgb(b.hue, 1.0, 0.5),
                    intensity: b.base_intensity * strobe * pulse + BEAM_BEAT_GAIN * beat,
                    aperture: BEAM_APERTURE + BEAM_APERTURE_SWING * (elapsed_sec + idx).sin(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn beams_ride_a_fixed_circle() {
        let rig = BeamRig::default();
        let mut rng = StdRng::seed_from_u64(8);
        for t in [0.0, 1.3, 7.9] {
            for f in rig.advance(t, 0.0, &mut rng) {
                let flat = Vec3::new(f.position.x, 0.0, f.position.z).length();
                assert!((flat - BEAM_RADIUS).abs() < 1e-3);
                assert_eq!(f.position.y, BEAM_HEIGHT);
                assert!(f.target.length() <= BEAM_AIM_WOBBLE + 1e-5);
            }
        }
    }

    #[test]
    fn intensity_bounds_include_strobe_and_beat() {
        let rig = BeamRig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut saw_strobe = false;
        for frame in 0..500 {
            let t = frame as f32 / 60.0;
            for (f, b) in rig.advance(t, 1.0, &mut rng).iter().zip(&rig.beams) {
                let lo = BEAM_BEAT_GAIN;
                let hi = b.base_intensity * BEAM_STROBE_GAIN + BEAM_BEAT_GAIN;
                assert!(f.intensity >= lo - 1e-4 && f.intensity <= hi + 1e-4);
                if f.intensity > b.base_intensity + BEAM_BEAT_GAIN + 1e-3 {
                    saw_strobe = true;
                }
            }
        }
        assert!(saw_strobe);
    }

    #[test]
    fn aperture_oscillates_around_base() {
        let rig = BeamRig::evenly_spaced(3);
        let mut rng = StdRng::seed_from_u64(10);
        let frames = rig.advance(0.0, 0.0, &mut rng);
        assert_eq!(frames.len(), 3);
        assert!((frames[0].aperture - BEAM_APERTURE).abs() < 1e-6);
        for f in &frames {
            assert!((f.aperture - BEAM_APERTURE).abs() <= BEAM_APERTURE_SWING + 1e-6);
        }
    }
}
