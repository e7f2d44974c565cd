//! Procedural surface texture: translucent gradient discs on black.
//!
//! Mirrors what a 2D canvas would produce for a diagonal linear gradient
//! (cyan → magenta → cyan at 20% alpha) used to fill overlapping circles,
//! composited source-over. The result is uploaded once as the centrepiece
//! cube's texture.

use crate::constants::{TEXTURE_CIRCLES, TEXTURE_RADIUS_MIN, TEXTURE_RADIUS_SPAN};
use rand::Rng;

const GRADIENT_ALPHA: f32 = 0.2;
const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];

/// Tightly packed RGBA8 pixels, row-major, `size * size * 4` bytes.
#[derive(Clone, Debug)]
pub struct TexturePixels {
    pub size: u32,
    pub rgba: Vec<u8>,
}

impl TexturePixels {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.size + x) * 4) as usize;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}

#[derive(Clone, Copy, Debug)]
struct Disc {
    cx: f32,
    cy: f32,
    r: f32,
}

/// Gradient colour at parameter `t` along the (0,0) → (size,size) diagonal.
fn gradient_at(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let (from, to, k) = if t < 0.5 {
        (CYAN, MAGENTA, t * 2.0)
    } else {
        (MAGENTA, CYAN, (t - 0.5) * 2.0)
    };
    [
        from[0] + (to[0] - from[0]) * k,
        from[1] + (to[1] - from[1]) * k,
        from[2] + (to[2] - from[2]) * k,
    ]
}

pub fn generate<R: Rng + ?Sized>(size: u32, rng: &mut R) -> TexturePixels {
    let size_f = size as f32;
    let discs: Vec<Disc> = (0..TEXTURE_CIRCLES)
        .map(|_| Disc {
            cx: rng.gen::<f32>() * size_f,
            cy: rng.gen::<f32>() * size_f,
            r: rng.gen::<f32>() * TEXTURE_RADIUS_SPAN + TEXTURE_RADIUS_MIN,
        })
        .collect();

    // Opaque black background; alpha stays 1 under source-over.
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    let diag = (2.0 * size_f * size_f).max(1.0);
    for y in 0..size {
        for x in 0..size {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let grad = gradient_at((px + py) * size_f / diag);
            let mut c = [0.0f32; 3];
            for d in &discs {
                let dx = px - d.cx;
                let dy = py - d.cy;
                if dx * dx + dy * dy <= d.r * d.r {
                    for k in 0..3 {
                        c[k] = grad[k] * GRADIENT_ALPHA + c[k] * (1.0 - GRADIENT_ALPHA);
                    }
                }
            }
            let i = ((y * size + x) * 4) as usize;
            rgba[i] = (c[0] * 255.0).round() as u8;
            rgba[i + 1] = (c[1] * 255.0).round() as u8;
            rgba[i + 2] = (c[2] * 255.0).round() as u8;
            rgba[i + 3] = 255;
        }
    }
    log::debug!("procedural texture {}x{} with {} discs", size, size, discs.len());
    TexturePixels { size, rgba }
}
