use super::helpers::{self, DEPTH_FORMAT, HDR_FORMAT};
use glam::{Mat4, Vec3};
use scene_core::ModelMesh;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SurfaceVertex {
    pub(crate) pos: [f32; 3],
    pub(crate) normal: [f32; 3],
    pub(crate) uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DrawUniforms {
    pub(crate) model: [[f32; 4]; 4],
    pub(crate) tint: [f32; 4],
    pub(crate) flags: [f32; 4],
}

impl DrawUniforms {
    pub(crate) fn new(model: Mat4, tint: [f32; 3], opacity: f32, lit: bool, ambient: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint: [tint[0], tint[1], tint[2], opacity],
            flags: [if lit { 1.0 } else { 0.0 }, ambient, 0.0, 0.0],
        }
    }
}

pub(crate) struct GpuMesh {
    vb: wgpu::Buffer,
    ib: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        vertices: &[SurfaceVertex],
        indices: &[u32],
    ) -> Self {
        let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vb,
            ib,
            index_count: indices.len() as u32,
        }
    }
}

/// A mesh plus its own per-draw uniforms and texture binding.
pub(crate) struct SurfaceDraw {
    mesh: GpuMesh,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SurfaceDraw {
    pub(crate) fn write(&self, queue: &wgpu::Queue, u: &DrawUniforms) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(u));
    }
}

pub(crate) struct SurfaceResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) draw_bgl: wgpu::BindGroupLayout,
    pub(crate) sampler: wgpu::Sampler,
}

pub(crate) fn create_surface_resources(
    device: &wgpu::Device,
    frame_bgl: &wgpu::BindGroupLayout,
) -> SurfaceResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("surface_shader"),
        source: wgpu::ShaderSource::Wgsl(scene_core::SURFACE_WGSL.into()),
    });
    let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("surface_draw_bgl"),
        entries: &[
            helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
            helpers::texture_entry(1),
            helpers::sampler_entry(2),
        ],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("surface_pl"),
        bind_group_layouts: &[frame_bgl, &draw_bgl],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("surface_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_surface"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SurfaceVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2
                ],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        // Quads and arbitrary models are viewed from both sides
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_surface"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("surface_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    SurfaceResources {
        pipeline,
        draw_bgl,
        sampler,
    }
}

impl SurfaceResources {
    pub(crate) fn make_draw(
        &self,
        device: &wgpu::Device,
        label: &str,
        mesh: GpuMesh,
        texture: &wgpu::TextureView,
    ) -> SurfaceDraw {
        let uniforms =
            helpers::uniform_buffer(device, label, std::mem::size_of::<DrawUniforms>());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.draw_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        SurfaceDraw {
            mesh,
            uniforms,
            bind_group,
        }
    }

    pub(crate) fn draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        frame_bg: &wgpu::BindGroup,
        item: &SurfaceDraw,
    ) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, frame_bg, &[]);
        rpass.set_bind_group(1, &item.bind_group, &[]);
        rpass.set_vertex_buffer(0, item.mesh.vb.slice(..));
        rpass.set_index_buffer(item.mesh.ib.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..item.mesh.index_count, 0, 0..1);
    }
}

/// Unit cube, one quad per face so each face carries the full texture.
pub(crate) fn cube_mesh() -> (Vec<SurfaceVertex>, Vec<u32>) {
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, right, up) in faces {
        let base = vertices.len() as u32;
        for (sx, sy, uv) in [
            (-1.0, -1.0, [0.0, 1.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (-1.0, 1.0, [0.0, 0.0]),
        ] {
            let p = (normal + right * sx + up * sy) * 0.5;
            vertices.push(SurfaceVertex {
                pos: p.to_array(),
                normal: normal.to_array(),
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// Upright quad in the XY plane, `height` tall and `height * aspect` wide.
pub(crate) fn quad_mesh(aspect: f32, height: f32) -> (Vec<SurfaceVertex>, Vec<u32>) {
    let hw = 0.5 * height * aspect;
    let hh = 0.5 * height;
    let v = |x: f32, y: f32, uv: [f32; 2]| SurfaceVertex {
        pos: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv,
    };
    (
        vec![
            v(-hw, -hh, [0.0, 1.0]),
            v(hw, -hh, [1.0, 1.0]),
            v(hw, hh, [1.0, 0.0]),
            v(-hw, hh, [0.0, 0.0]),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

pub(crate) fn model_vertices(mesh: &ModelMesh) -> Vec<SurfaceVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| SurfaceVertex {
            pos: *p,
            normal: *n,
            uv: [0.5, 0.5],
        })
        .collect()
}
