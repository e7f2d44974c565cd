pub mod assets;
pub mod beams;
pub mod beat;
pub mod camera;
pub mod clock;
pub mod color;
pub mod constants;
pub mod error;
pub mod params;
pub mod particles;
pub mod phase;
pub mod scene;
pub mod swarm;
pub mod texture;

pub use assets::*;
pub use beams::*;
pub use beat::*;
pub use camera::*;
pub use clock::*;
pub use constants::*;
pub use error::*;
pub use params::*;
pub use particles::*;
pub use phase::*;
pub use scene::*;
pub use swarm::*;

// Shaders bundled as string constants
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");
pub static SPRITES_WGSL: &str = include_str!("../shaders/sprites.wgsl");
pub static SURFACE_WGSL: &str = include_str!("../shaders/surface.wgsl");
