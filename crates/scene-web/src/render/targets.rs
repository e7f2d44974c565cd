use super::helpers::{self, DEPTH_FORMAT, HDR_FORMAT};

/// Offscreen targets for the scene and bloom passes.
///
/// - `hdr_view` holds the main scene color in Rgba16Float for post-processing.
/// - `depth_view` is the scene depth buffer, same size as the HDR target.
/// - `bloom_*` are half-res ping-pong buffers used for bright-pass and blur.
///
/// Views keep their textures alive, so only views are stored.
pub(crate) struct RenderTargets {
    pub(crate) hdr_view: wgpu::TextureView,
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b_view: wgpu::TextureView,
    pub(crate) bloom_size: [f32; 2],
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let (w, h) = (width.max(1), height.max(1));
        let (_, hdr_view) =
            helpers::create_color_texture(device, "hdr_tex", w, h, HDR_FORMAT, sampled);
        let (_, depth_view) = helpers::create_color_texture(
            device,
            "depth_tex",
            w,
            h,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let bw = (w / 2).max(1);
        let bh = (h / 2).max(1);
        let (_, bloom_a_view) =
            helpers::create_color_texture(device, "bloom_a", bw, bh, HDR_FORMAT, sampled);
        let (_, bloom_b_view) =
            helpers::create_color_texture(device, "bloom_b", bw, bh, HDR_FORMAT, sampled);
        Self {
            hdr_view,
            depth_view,
            bloom_a_view,
            bloom_b_view,
            bloom_size: [bw as f32, bh as f32],
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }
}
