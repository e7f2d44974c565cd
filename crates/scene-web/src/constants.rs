/// Front-end wiring and render tuning constants.
///
/// Simulation tuning lives in `scene_core::constants`; these only concern the
/// page and the GPU passes.
// DOM
pub const CANVAS_ID: &str = "scene-canvas";
pub const CAPTION_ID: &str = "caption-overlay";

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 1.1;
pub const BLOOM_THRESHOLD: f32 = 0.7;

// Background
pub const CLEAR_RGB: [f64; 3] = [0.005, 0.006, 0.012];

// Sprite sizes (world units)
pub const PARTICLE_SIZE: f32 = 0.06;
pub const SWARM_AGENT_SIZE: f32 = 0.05;
pub const TRAIL_SIZE: f32 = 0.03;
pub const BEAM_SOURCE_SIZE: f32 = 0.25;

// HDR gain applied to particle/agent colours so they feed the bloom pass
pub const SPRITE_HDR_GAIN: f32 = 2.5;
pub const BEAM_SOURCE_GAIN: f32 = 0.4;

// Surfaces
pub const SURFACE_AMBIENT: f32 = 0.25;
pub const IMAGE_QUAD_HEIGHT: f32 = 2.5;
pub const MODEL_SCALE: f32 = 1.6;

// Upper bound on beams the surface shader reads
pub const MAX_SHADER_BEAMS: usize = 8;
