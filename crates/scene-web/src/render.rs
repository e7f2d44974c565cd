use crate::constants::*;
use glam::{Mat4, Quat, Vec3};
use scene_core::{AssetSlot, ImagePixels, ModelMesh, Phase, RevealKind, Scene, CUBE_OPACITY};
use scene_core::texture::TexturePixels;
use web_sys as web;

mod helpers;
mod post;
mod sprites;
mod surfaces;
mod targets;
use post::{PostBindGroups, PostResources, PostUniforms};
use sprites::SpriteResources;
use surfaces::{DrawUniforms, GpuMesh, SurfaceDraw, SurfaceResources};
use targets::RenderTargets;

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct BeamPacked {
    pos_intensity: [f32; 4],
    dir_cos: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
    info: [f32; 4],
    beams: [BeamPacked; MAX_SHADER_BEAMS],
}

impl FrameUniforms {
    fn from_scene(scene: &Scene) -> Self {
        let cam = scene.camera();
        let forward = (cam.target - cam.eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward.cross(cam.up).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        let mut beams = [BeamPacked::default(); MAX_SHADER_BEAMS];
        let count = scene.beams().len().min(MAX_SHADER_BEAMS);
        for (slot, b) in beams.iter_mut().zip(scene.beams().iter()) {
            let dir = (b.target - b.position).try_normalize().unwrap_or(Vec3::NEG_Y);
            *slot = BeamPacked {
                pos_intensity: [b.position.x, b.position.y, b.position.z, b.intensity],
                dir_cos: [dir.x, dir.y, dir.z, b.aperture.cos()],
                color: [b.color[0], b.color[1], b.color[2], 1.0],
            };
        }
        Self {
            view_proj: cam.view_proj().to_cols_array_2d(),
            eye: cam.eye.extend(1.0).to_array(),
            cam_right: right.extend(0.0).to_array(),
            cam_up: up.extend(0.0).to_array(),
            info: [count as f32, scene.beat(), scene.elapsed_sec() as f32, 0.0],
            beams,
        }
    }
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,

    frame_buffer: wgpu::Buffer,
    frame_bg: wgpu::BindGroup,

    sprites: SpriteResources,
    surfaces: SurfaceResources,
    cube: SurfaceDraw,
    reveal_model: Option<SurfaceDraw>,
    reveal_image: Option<SurfaceDraw>,
    white_view: wgpu::TextureView,

    post: PostResources,
    post_groups: PostBindGroups,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        canvas: &'a web::HtmlCanvasElement,
        scene: &Scene,
        texture: &TexturePixels,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Per-frame camera + spotlight uniforms shared by sprites and surfaces
        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[helpers::uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let frame_buffer = helpers::uniform_buffer(
            &device,
            "frame_uniforms",
            std::mem::size_of::<FrameUniforms>(),
        );
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sprites =
            sprites::create_sprite_resources(&device, &frame_bgl, sprites::sprite_capacity(scene));
        let surfaces = surfaces::create_surface_resources(&device, &frame_bgl);

        let (_, cube_view) = helpers::upload_rgba_texture(
            &device,
            &queue,
            "cube_texture",
            texture.size,
            texture.size,
            &texture.rgba,
        );
        let (cube_vertices, cube_indices) = surfaces::cube_mesh();
        let cube = surfaces.make_draw(
            &device,
            "cube",
            GpuMesh::new(&device, "cube_mesh", &cube_vertices, &cube_indices),
            &cube_view,
        );
        let (_, white_view) =
            helpers::upload_rgba_texture(&device, &queue, "white_texture", 1, 1, &[255; 4]);

        let post = post::create_post_resources(&device, helpers::HDR_FORMAT, format);
        let post_groups = post::build_bind_groups(&device, &post, &linear_sampler, &targets);

        log::info!("webgpu ready: {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            linear_sampler,
            frame_buffer,
            frame_bg,
            sprites,
            surfaces,
            cube,
            reveal_model: None,
            reveal_image: None,
            white_view,
            post,
            post_groups,
            width,
            height,
            clear_color: wgpu::Color {
                r: CLEAR_RGB[0],
                g: CLEAR_RGB[1],
                b: CLEAR_RGB[2],
                a: 1.0,
            },
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            // Recreate offscreen render targets and the bind groups that sample them
            self.targets.recreate(&self.device, width, height);
            self.post_groups = post::build_bind_groups(
                &self.device,
                &self.post,
                &self.linear_sampler,
                &self.targets,
            );
        }
    }

    /// Create GPU resources for reveal assets the first time they become ready.
    pub fn upload_assets(&mut self, model: &AssetSlot<ModelMesh>, image: &AssetSlot<ImagePixels>) {
        if self.reveal_model.is_none() {
            if let Some(mesh) = model.ready() {
                let vertices = surfaces::model_vertices(mesh);
                let gpu = GpuMesh::new(&self.device, "model_mesh", &vertices, &mesh.indices);
                self.reveal_model =
                    Some(self.surfaces.make_draw(&self.device, "model", gpu, &self.white_view));
                log::debug!("model uploaded: {} triangles", mesh.triangle_count());
            }
        }
        if self.reveal_image.is_none() {
            if let Some(img) = image.ready() {
                let (_, view) = helpers::upload_rgba_texture(
                    &self.device,
                    &self.queue,
                    "reveal_image",
                    img.width,
                    img.height,
                    &img.rgba,
                );
                let (vertices, indices) = surfaces::quad_mesh(img.aspect(), IMAGE_QUAD_HEIGHT);
                let gpu = GpuMesh::new(&self.device, "image_quad", &vertices, &indices);
                self.reveal_image =
                    Some(self.surfaces.make_draw(&self.device, "image", gpu, &view));
            }
        }
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
        );
        let sprite_count = self.sprites.upload(&self.queue, scene);
        let elapsed = scene.elapsed_sec() as f32;

        // Which surface is on stage depends on the phase
        let on_stage: Option<&SurfaceDraw> = match scene.phase() {
            Phase::Exploding => {
                let [rx, ry] = scene.cube_rotation();
                let model = Mat4::from_rotation_x(rx) * Mat4::from_rotation_y(ry);
                self.cube.write(
                    &self.queue,
                    &DrawUniforms::new(model, [1.0; 3], CUBE_OPACITY, false, 1.0),
                );
                Some(&self.cube)
            }
            Phase::Revealed {
                kind: RevealKind::Model,
                ..
            } => self.reveal_model.as_ref().map(|d| {
                let model = Mat4::from_scale_rotation_translation(
                    Vec3::splat(MODEL_SCALE),
                    Quat::from_rotation_y(0.4 * elapsed),
                    Vec3::ZERO,
                );
                d.write(
                    &self.queue,
                    &DrawUniforms::new(model, [1.0; 3], 1.0, true, SURFACE_AMBIENT),
                );
                d
            }),
            Phase::Revealed {
                kind: RevealKind::Image,
                ..
            } => self.reveal_image.as_ref().map(|d| {
                d.write(
                    &self.queue,
                    &DrawUniforms::new(Mat4::IDENTITY, [1.0; 3], 1.0, true, SURFACE_AMBIENT),
                );
                d
            }),
            Phase::Swarming(_) => None,
        };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(item) = on_stage {
                self.surfaces.draw(&mut rpass, &self.frame_bg, item);
            }
            self.sprites.draw(&mut rpass, &self.frame_bg, sprite_count);
        }

        post::write_uniforms(
            &self.queue,
            &self.post,
            PostUniforms {
                resolution: self.targets.bloom_size,
                time: elapsed,
                beat: scene.beat(),
                blur_dir: [0.0, 0.0],
                bloom_strength: BLOOM_STRENGTH,
                threshold: BLOOM_THRESHOLD,
            },
        );

        // bright pass → bloom_a
        post::blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.bright_pipeline,
            &self.post_groups.bright,
            None,
        );
        // blur horizontal bloom_a → bloom_b
        post::blit(
            &mut encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.post_groups.blur_h,
            None,
        );
        // blur vertical bloom_b → bloom_a
        post::blit(
            &mut encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.post_groups.blur_v,
            None,
        );
        // composite to swapchain
        post::blit(
            &mut encoder,
            "composite",
            &view,
            self.clear_color,
            &self.post.composite_pipeline,
            &self.post_groups.composite,
            Some(&self.post_groups.composite_bloom),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
