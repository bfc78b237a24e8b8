use std::borrow::Cow;

use bytemuck::Zeroable;
use cgmath::{Matrix3, Matrix4};
use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Source of the bump lighting program.
pub const BUMP_SHADER: &str = include_str!("bump.wgsl");

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to compile shader `{label}`:\n{diagnostic}")]
    Compile { label: String, diagnostic: String },
    #[error("shader `{label}` failed validation:\n{diagnostic}")]
    Validate { label: String, diagnostic: String },
    #[error("shader `{label}` cannot be linked: no {stage:?} entry point `{entry_point}`")]
    MissingEntryPoint {
        label: String,
        stage: naga::ShaderStage,
        entry_point: &'static str,
    },
}

/// Parse and validate WGSL, then check both stages are present.
///
/// wgpu would report the same problems through its uncaptured error handler,
/// which panics. Running naga up front turns them into a [`ShaderError`] the
/// caller can surface before any pipeline is built.
pub fn validate_wgsl(label: &str, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        label: label.to_string(),
        diagnostic: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validate {
        label: label.to_string(),
        diagnostic: e.emit_to_string(source),
    })?;

    for (stage, entry_point) in [
        (naga::ShaderStage::Vertex, VERTEX_ENTRY),
        (naga::ShaderStage::Fragment, FRAGMENT_ENTRY),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == entry_point);
        if !found {
            return Err(ShaderError::MissingEntryPoint {
                label: label.to_string(),
                stage,
                entry_point,
            });
        }
    }
    Ok(module)
}

/// Per-frame uniforms, laid out to match `Uniforms` in `bump.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    // mat3x3 columns are padded to 16 bytes in uniform memory
    pub normal_matrix: [[f32; 4]; 3],
    pub light_position: [f32; 3],
    pub ambient_coeff: f32,
    pub ambient_colour: [f32; 3],
    pub c1: f32,
    pub diffuse_colour: [f32; 3],
    pub c2: f32,
    pub specular_colour: [f32; 3],
    pub light_outer: f32,
    pub object_colour: [f32; 3],
    pub _padding: f32,
    pub texture_size: [f32; 2],
    pub _padding2: [f32; 2],
}

impl LightingUniform {
    pub fn set_proj(&mut self, proj: Matrix4<f32>) {
        self.proj = proj.into();
    }

    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.model = model.into();
    }

    pub fn set_normal_matrix(&mut self, normal: Matrix3<f32>) {
        self.normal_matrix = [
            normal.x.extend(0.0).into(),
            normal.y.extend(0.0).into(),
            normal.z.extend(0.0).into(),
        ];
    }
}

/// Whether the texture-coordinate slot is fed by the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TexCoordSlot {
    Enabled,
    /// Slot 2 reads one constant `(0, 0)` for every vertex.
    Disabled,
}

pub struct VertexSlots;

impl VertexSlots {
    pub const POSITION: u32 = 0;
    pub const NORMAL: u32 = 1;
    pub const TEX_COORDS: u32 = 2;

    const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![0 => Float32x3];
    const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![1 => Float32x3];
    const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![2 => Float32x2];

    pub fn layouts(tex_coords: TexCoordSlot) -> [wgpu::VertexBufferLayout<'static>; 3] {
        let tex_step_mode = match tex_coords {
            TexCoordSlot::Enabled => wgpu::VertexStepMode::Vertex,
            TexCoordSlot::Disabled => wgpu::VertexStepMode::Instance,
        };
        [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &Self::POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &Self::NORMAL_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: tex_step_mode,
                attributes: &Self::TEX_COORD_ATTRIBUTES,
            },
        ]
    }
}

pub fn uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("lighting_uniform_layout"),
    })
}

pub fn bump_texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("bump_texture_layout"),
    })
}

/// The compiled bump program: pipelines, uniform storage and the bind group
/// layouts the rest of the renderer binds against.
///
/// Built once and never rebuilt.
pub struct ShaderProgram {
    textured: wgpu::RenderPipeline,
    untextured: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    disabled_tex_coords: wgpu::Buffer,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        label: &str,
        source: &str,
    ) -> Result<Self, ShaderError> {
        validate_wgsl(label, source)?;
        log::info!("shader `{}` validated", label);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });

        let uniform_layout = uniform_layout(device);
        let texture_layout = bump_texture_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bump Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let textured = mk_render_pipeline(
            device,
            &layout,
            &shader,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &VertexSlots::layouts(TexCoordSlot::Enabled),
        );
        let untextured = mk_render_pipeline(
            device,
            &layout,
            &shader,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &VertexSlots::layouts(TexCoordSlot::Disabled),
        );

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lighting Uniform Buffer"),
            contents: bytemuck::cast_slice(&[LightingUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("lighting_uniform_bind_group"),
        });

        let disabled_tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Disabled TexCoord Buffer"),
            contents: bytemuck::cast_slice(&[[0.0f32; 2]]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            textured,
            untextured,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            disabled_tex_coords,
        })
    }

    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniform: &LightingUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Make the program current and bind its uniforms to group 0.
    pub fn activate(&self, render_pass: &mut wgpu::RenderPass<'_>, tex_coords: TexCoordSlot) {
        let pipeline = match tex_coords {
            TexCoordSlot::Enabled => &self.textured,
            TexCoordSlot::Disabled => &self.untextured,
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
    }

    /// Constant buffer bound to slot 2 while it is disabled.
    pub fn disabled_tex_coords(&self) -> &wgpu::Buffer {
        &self.disabled_tex_coords
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Bump Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(VERTEX_ENTRY),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // both faces are drawn, the depth test sorts them out
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
