use glam::Vec3;

// Shared timing/tuning constants for the scene simulation.

// Frame clock
pub const MAX_FRAME_DT: f32 = 0.1; // clamp for long stalls (tab switch, debugger)
pub const REFERENCE_FRAME_HZ: f32 = 60.0; // refresh rate the per-frame constants were tuned at

// Procedural texture
pub const TEXTURE_SIZE: u32 = 512;
pub const TEXTURE_CIRCLES: usize = 20;
pub const TEXTURE_RADIUS_MIN: f32 = 20.0;
pub const TEXTURE_RADIUS_SPAN: f32 = 50.0;

// Centrepiece cube
pub const CUBE_SPIN_PER_FRAME: f32 = 0.01; // radians, x and y
pub const CUBE_OPACITY: f32 = 0.7;

// Explosion
pub const PARTICLE_COUNT: usize = 2000;
pub const MAX_PARTICLE_COUNT: usize = 200_000; // query override ceiling
pub const PARTICLE_LIFETIME_MIN: f32 = 2.0;
pub const PARTICLE_LIFETIME_MAX: f32 = 4.0;
pub const PARTICLE_SPEED_MIN: f32 = 1.0;
pub const PARTICLE_SPEED_MAX: f32 = 5.0;
pub const PARTICLE_FADE_SECS: f32 = 2.0; // opacity = remaining / fade
pub const LIFETIME_EPSILON: f32 = 1e-4; // remaining lifetime treated as zero

// Reveal
pub const REVEAL_NEAR_END_LIFETIME: f32 = 0.5; // "near end of life" threshold (s)
pub const REVEAL_MIN_FRACTION: f32 = 0.005; // 0.5% of particles near end of life
pub const REVEAL_HOLD_SECS: f32 = 6.0; // time the reveal stays before the swarm

// Swarm
pub const SWARM_COUNT: usize = 300;
pub const SWARM_TRAIL_LEN: usize = 20;
pub const MAX_SWARM_COUNT: usize = 5_000; // query override ceiling
pub const MAX_SWARM_TRAIL_LEN: usize = 200; // query override ceiling
pub const SWARM_RADIUS: f32 = 2.0;
pub const SWARM_INITIAL_SPEED: f32 = 0.01;
pub const SWARM_JITTER: f32 = 0.005;
pub const SWARM_DAMPING: f32 = 0.99; // per frame

// Beat
pub const BEAT_INTERVAL_MS: f64 = 500.0;
pub const BEAT_DECAY: f32 = 0.95; // per frame

// Camera
pub const CAMERA_TARGETS: [Vec3; 5] = [
    Vec3::new(0.0, 0.0, 5.0),
    Vec3::new(5.0, 2.0, 0.0),
    Vec3::new(0.0, 5.0, 3.0),
    Vec3::new(-5.0, 1.0, 2.0),
    Vec3::new(3.0, -2.0, 4.0),
];
pub const CAMERA_TRANSITION_SECS: f32 = 2.0;
pub const CAMERA_BASE_ZOOM: f32 = 6.0;
pub const CAMERA_ZOOM_BEAT_PULL: f32 = 2.0;
pub const CAMERA_ZOOM_RATE: f32 = 3.0;
pub const CAMERA_SHAKE_MAX: f32 = 0.3;
pub const CAMERA_SHAKE_DECAY: f32 = 0.95; // per frame
pub const CAMERA_SHAKE_FLOOR: f32 = 1e-4;
pub const CAMERA_CUT_BEAT: f32 = 0.8;
pub const CAMERA_CUT_CHANCE: f32 = 0.7; // draw must exceed this
pub const CAMERA_WHIP_BEAT: f32 = 0.9;
pub const CAMERA_WHIP_CHANCE: f32 = 0.8;
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Light beams
pub const BEAM_COUNT: usize = 6;
pub const BEAM_RADIUS: f32 = 6.0;
pub const BEAM_HEIGHT: f32 = 4.0;
pub const BEAM_BASE_INTENSITY: f32 = 2.0;
pub const BEAM_STROBE_CHANCE: f32 = 0.1;
pub const BEAM_STROBE_GAIN: f32 = 3.0;
pub const BEAM_BEAT_GAIN: f32 = 2.0;
pub const BEAM_APERTURE: f32 = 0.3; // radians
pub const BEAM_APERTURE_SWING: f32 = 0.1;
pub const BEAM_AIM_WOBBLE: f32 = 0.5;
