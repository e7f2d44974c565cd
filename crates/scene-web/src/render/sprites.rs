use super::helpers::{DEPTH_FORMAT, HDR_FORMAT};
use crate::constants::*;
use scene_core::{Phase, Scene, BEAM_COUNT};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SpriteInstance {
    pub(crate) pos_size: [f32; 4],
    pub(crate) color: [f32; 4],
}

pub(crate) struct SpriteResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) quad_vb: wgpu::Buffer,
    pub(crate) instance_vb: wgpu::Buffer,
    pub(crate) capacity: usize,
    pub(crate) staging: Vec<SpriteInstance>,
}

/// Upper bound on sprites the scene can ever emit in one frame.
pub(crate) fn sprite_capacity(scene: &Scene) -> usize {
    let p = &scene.params;
    let swarm = p.swarm_count.saturating_mul(p.swarm_trail_len.saturating_add(1));
    p.burst.count.max(swarm).saturating_add(BEAM_COUNT)
}

pub(crate) fn create_sprite_resources(
    device: &wgpu::Device,
    frame_bgl: &wgpu::BindGroupLayout,
    capacity: usize,
) -> SpriteResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sprites_shader"),
        source: wgpu::ShaderSource::Wgsl(scene_core::SPRITES_WGSL.into()),
    });
    // Two triangles spanning the unit disc's bounding square
    let quad_vertices: [f32; 12] = [
        -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0,
    ];
    let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sprite_quad_vb"),
        contents: bytemuck::cast_slice(&quad_vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let capacity = capacity.max(1);
    let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite_instance_vb"),
        size: (std::mem::size_of::<SpriteInstance>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sprites_pl"),
        bind_group_layouts: &[frame_bgl],
        push_constant_ranges: &[],
    });
    let vertex_buffers = [
        // slot 0: quad corners
        wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        },
        // slot 1: per-sprite data
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 0,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 2,
                },
            ],
        },
    ];
    let additive = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sprites_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_sprite"),
            buffers: &vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        // Tested against surfaces but never written: sprites blend in any order.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_sprite"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(wgpu::BlendState {
                    color: additive,
                    alpha: additive,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });

    SpriteResources {
        pipeline,
        quad_vb,
        instance_vb,
        capacity,
        staging: Vec::with_capacity(capacity),
    }
}

fn rgba(rgb: [f32; 3], gain: f32, alpha: f32) -> [f32; 4] {
    [rgb[0] * gain, rgb[1] * gain, rgb[2] * gain, alpha]
}

/// Gather this frame's billboards: burst particles while exploding, agents and
/// their fading trails while swarming, and the beam sources always.
pub(crate) fn collect_sprites(scene: &Scene, out: &mut Vec<SpriteInstance>) {
    out.clear();
    match scene.phase() {
        Phase::Exploding => {
            let p = scene.particles();
            for i in 0..p.len() {
                if p.opacity[i] <= 0.0 {
                    continue;
                }
                let pos = p.position[i];
                out.push(SpriteInstance {
                    pos_size: [pos.x, pos.y, pos.z, PARTICLE_SIZE],
                    color: rgba(p.color[i], SPRITE_HDR_GAIN, p.opacity[i]),
                });
            }
        }
        Phase::Swarming(swarm) => {
            for agent in &swarm.agents {
                let pos = agent.position;
                out.push(SpriteInstance {
                    pos_size: [pos.x, pos.y, pos.z, SWARM_AGENT_SIZE],
                    color: rgba(agent.color, SPRITE_HDR_GAIN, 1.0),
                });
                let len = agent.max_trail_len.max(1) as f32;
                for (k, t) in agent.trail.iter().enumerate() {
                    let fade = 1.0 - k as f32 / len;
                    out.push(SpriteInstance {
                        pos_size: [t.x, t.y, t.z, TRAIL_SIZE],
                        color: rgba(agent.color, SPRITE_HDR_GAIN, 0.6 * fade),
                    });
                }
            }
        }
        Phase::Revealed { .. } => {}
    }
    for beam in scene.beams() {
        let pos = beam.position;
        out.push(SpriteInstance {
            pos_size: [pos.x, pos.y, pos.z, BEAM_SOURCE_SIZE],
            color: rgba(beam.color, BEAM_SOURCE_GAIN * beam.intensity, 1.0),
        });
    }
}

impl SpriteResources {
    /// Upload this frame's sprites; returns how many to draw.
    pub(crate) fn upload(&mut self, queue: &wgpu::Queue, scene: &Scene) -> u32 {
        collect_sprites(scene, &mut self.staging);
        if self.staging.len() > self.capacity {
            log::warn!(
                "sprite overflow: {} > {}, truncating",
                self.staging.len(),
                self.capacity
            );
            self.staging.truncate(self.capacity);
        }
        if !self.staging.is_empty() {
            queue.write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&self.staging));
        }
        self.staging.len() as u32
    }

    pub(crate) fn draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        frame_bg: &wgpu::BindGroup,
        count: u32,
    ) {
        if count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, frame_bg, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
        rpass.draw(0..6, 0..count);
    }
}
