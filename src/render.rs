//! Per-frame drawing of the bump-mapped mesh.
//!
//! A frame is a single render pass: clear colour and depth, push the
//! uniforms, bind the program, mesh buffers and bump map, issue one indexed
//! draw. [`Renderer::draw`] records that pass into any colour/depth target,
//! [`Renderer::render_frame`] does it for the window surface and presents.

use std::iter;

use bytemuck::Zeroable;

use crate::{
    config::{DemoConfig, LightConfig},
    context::Context,
    data_structures::texture::Texture,
    pipelines::{
        mipmap::MipmapGenerator,
        program::{BUMP_SHADER, LightingUniform, ShaderProgram},
    },
    resources::{
        mesh::{GpuMesh, load_mesh},
        texture::BumpTexture,
    },
    scene::Scene,
};

/// Everything the lighting program reads in one frame.
pub fn lighting_uniform(
    scene: &Scene,
    light: &LightConfig,
    object_colour: [f32; 3],
    texture_size: [u32; 2],
) -> LightingUniform {
    let mut uniform = LightingUniform::zeroed();
    uniform.set_proj(scene.projection());
    uniform.set_model(scene.model_matrix());
    uniform.set_normal_matrix(scene.normal_matrix());
    uniform.light_position = light.position;
    uniform.ambient_colour = light.ambient_colour;
    uniform.diffuse_colour = light.diffuse_colour;
    uniform.specular_colour = light.specular_colour;
    uniform.ambient_coeff = scene.params.ambient_coeff;
    uniform.c1 = scene.params.c1;
    uniform.c2 = scene.params.c2;
    uniform.light_outer = scene.params.light_outer;
    uniform.object_colour = object_colour;
    uniform.texture_size = [texture_size[0] as f32, texture_size[1] as f32];
    uniform
}

pub struct Renderer {
    program: ShaderProgram,
    mipmaps: MipmapGenerator,
    mesh: GpuMesh,
    texture: BumpTexture,
    light: LightConfig,
    object_colour: [f32; 3],
}

impl Renderer {
    /// Build the program, start loading the bump map, then load and upload
    /// the mesh.
    ///
    /// Shader failures are returned before anything else is created. A mesh
    /// that cannot be loaded is fatal as well; a missing bump map is not.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        config: &DemoConfig,
        #[cfg(not(target_arch = "wasm32"))] runtime: &tokio::runtime::Handle,
    ) -> anyhow::Result<Self> {
        let program = ShaderProgram::new(device, color_format, "bump.wgsl", BUMP_SHADER)?;
        let texture = BumpTexture::load(
            &config.bump_file,
            device,
            queue,
            program.texture_layout(),
            #[cfg(not(target_arch = "wasm32"))]
            runtime,
        )?;
        let mesh_data = load_mesh(&config.mesh_file, config.mesh_scale).await?;
        let mesh = GpuMesh::upload(device, &mesh_data);
        Ok(Self::from_parts(device, program, mesh, texture, config))
    }

    pub fn from_parts(
        device: &wgpu::Device,
        program: ShaderProgram,
        mesh: GpuMesh,
        texture: BumpTexture,
        config: &DemoConfig,
    ) -> Self {
        Self {
            program,
            mipmaps: MipmapGenerator::new(device, Texture::BUMP_FORMAT),
            mesh,
            texture,
            light: config.light,
            object_colour: config.object_colour,
        }
    }

    /// Bind the decoded bump map once it is available.
    pub fn poll_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let replaced = self
            .texture
            .poll(device, queue, self.program.texture_layout(), &self.mipmaps);
        if replaced {
            log::info!(
                "bump map {} bound ({}x{})",
                self.texture.name,
                self.texture.size()[0],
                self.texture.size()[1]
            );
        }
        replaced
    }

    pub fn texture(&self) -> &BumpTexture {
        &self.texture
    }

    pub fn uniform(&self, scene: &Scene) -> LightingUniform {
        lighting_uniform(scene, &self.light, self.object_colour, self.texture.size())
    }

    /// Record one frame into `color_view` / `depth_view`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        size: [u32; 2],
        clear_colour: wgpu::Color,
        scene: &Scene,
    ) {
        self.program.write_uniforms(queue, &self.uniform(scene));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Bump Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        render_pass.set_viewport(0.0, 0.0, size[0] as f32, size[1] as f32, 0.0, 1.0);
        self.mesh.bind(&mut render_pass, &self.program);
        render_pass.set_bind_group(1, self.texture.bind_group(), &[]);
        self.mesh.draw(&mut render_pass);
    }

    /// Draw into the window surface and present it.
    pub fn render_frame(&self, ctx: &Context, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.draw(
            &ctx.queue,
            &mut encoder,
            &view,
            &ctx.depth_texture.view,
            ctx.size(),
            ctx.clear_colour,
            scene,
        );
        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
