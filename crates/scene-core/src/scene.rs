use crate::assets::AssetPresence;
use crate::beams::{BeamFrames, BeamRig};
use crate::beat::BeatEstimator;
use crate::camera::{Camera, CameraPose, CameraRig};
use crate::constants::{BEAT_INTERVAL_MS, CUBE_SPIN_PER_FRAME, MAX_FRAME_DT};
use crate::params::SceneParams;
use crate::particles::ParticleBuffer;
use crate::phase::{Phase, PhaseEvent, PhaseSequencer, SwarmSpec};
use crate::texture::{self, TexturePixels};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What happened during one `Scene::advance`.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    pub dt_sec: f32,
    pub beat: f32,
    pub event: Option<PhaseEvent>,
}

/// Complete simulation state, owned by the frame driver.
///
/// Each `advance` runs the components in a fixed order: clock, beat,
/// particles, phase transition, swarm, camera, beams, centrepiece spin.
pub struct Scene {
    pub params: SceneParams,
    rng: StdRng,
    elapsed_sec: f64,
    beat: BeatEstimator,
    particles: ParticleBuffer,
    sequencer: PhaseSequencer,
    camera_rig: CameraRig,
    camera: Camera,
    beam_rig: BeamRig,
    beams: BeamFrames,
    cube_rotation: [f32; 2],
}

impl Scene {
    pub fn new(params: SceneParams) -> Self {
        let mut rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let particles = ParticleBuffer::seed(&params.burst, &mut rng);
        let sequencer = PhaseSequencer::new(
            params.reveal,
            params.reveal_hold_secs,
            SwarmSpec {
                count: params.swarm_count,
                trail_len: params.swarm_trail_len,
                clock: params.decay_clock,
            },
        );
        let camera_rig = CameraRig::new(params.base_zoom, params.decay_clock);
        let camera = Camera {
            eye: camera_rig.position,
            ..Camera::default()
        };
        let beat = BeatEstimator::new(BEAT_INTERVAL_MS, params.decay_clock);
        log::info!(
            "scene: {} particles, reveal {:?}, seed {:?}",
            particles.len(),
            params.reveal.kind(),
            params.seed
        );
        Self {
            params,
            rng,
            elapsed_sec: 0.0,
            beat,
            particles,
            sequencer,
            camera_rig,
            camera,
            beam_rig: BeamRig::default(),
            beams: BeamFrames::new(),
            cube_rotation: [0.0, 0.0],
        }
    }

    /// Generate the centrepiece texture from the scene's random stream.
    pub fn generate_texture(&mut self) -> TexturePixels {
        texture::generate(self.params.texture_size, &mut self.rng)
    }

    pub fn advance(&mut self, dt_sec: f32, assets: AssetPresence) -> FrameReport {
        let dt = dt_sec.clamp(0.0, MAX_FRAME_DT);
        self.elapsed_sec += dt as f64;
        let now = self.elapsed_sec as f32;

        let beat = self.beat.tick(self.elapsed_sec);

        if self.sequencer.phase().is_exploding() {
            self.particles.advance(dt);
        }

        let event = self
            .sequencer
            .step(now, &self.particles, assets, &mut self.rng);

        if let Some(swarm) = self.sequencer.phase_mut().swarm_mut() {
            swarm.advance(dt, &mut self.rng);
        }

        let CameraPose { eye, look_at } = self.camera_rig.advance(now, dt, beat, &mut self.rng);
        self.camera.eye = eye;
        self.camera.target = look_at;

        self.beams = self.beam_rig.advance(now, beat, &mut self.rng);

        self.cube_rotation[0] += CUBE_SPIN_PER_FRAME;
        self.cube_rotation[1] += CUBE_SPIN_PER_FRAME;

        FrameReport {
            dt_sec: dt,
            beat,
            event,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    #[inline]
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    #[inline]
    pub fn beat(&self) -> f32 {
        self.beat.intensity()
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        self.sequencer.phase()
    }

    #[inline]
    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn beams(&self) -> &BeamFrames {
        &self.beams
    }

    #[inline]
    pub fn cube_rotation(&self) -> [f32; 2] {
        self.cube_rotation
    }

    /// The explosion is over once the sequencer has left `Exploding`.
    #[inline]
    pub fn explosion_complete(&self) -> bool {
        !self.phase().is_exploding()
    }
}
