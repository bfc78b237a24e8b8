use std::io::{BufReader, Cursor};

use anyhow::{Context, bail};
use cgmath::{InnerSpace, Vector3, Zero};
use wgpu::util::DeviceExt;

use crate::{
    pipelines::program::{ShaderProgram, TexCoordSlot, VertexSlots},
    resources::load_string,
};

/// Triangle mesh on the host, ready to be uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// `None` when the source had no texture coordinates at all.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

impl MeshData {
    /// Parse OBJ text and scale every position by `scale`.
    ///
    /// All objects in the file are merged into one mesh. Material libraries
    /// are ignored, the bump map is the only texture.
    pub async fn parse_obj(name: &str, obj_text: &str, scale: f32) -> anyhow::Result<Self> {
        let mut obj_reader = BufReader::new(Cursor::new(obj_text));
        let (models, _) = tobj::load_obj_buf_async(&mut obj_reader, &load_options(), |p| async move {
            log::debug!("ignoring material library {}", p);
            Err(tobj::LoadError::OpenFileFailed)
        })
        .await
        .with_context(|| format!("cannot parse {}", name))?;

        Self::from_models(name, &models, scale)
    }

    pub fn from_models(name: &str, models: &[tobj::Model], scale: f32) -> anyhow::Result<Self> {
        let mut data = MeshData {
            name: name.to_string(),
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: None,
            indices: Vec::new(),
        };
        let any_tex_coords = models.iter().any(|m| !m.mesh.texcoords.is_empty());
        let mut tex_coords = Vec::new();

        for m in models {
            let mesh = &m.mesh;
            let offset = data.positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            data.positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| [p[0] * scale, p[1] * scale, p[2] * scale]),
            );

            if mesh.normals.len() == mesh.positions.len() {
                data.normals
                    .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
            } else {
                log::warn!(
                    "`{}` in {} has no usable normals, computing smooth ones",
                    m.name,
                    name
                );
                data.normals
                    .extend(smooth_normals(&mesh.positions, &mesh.indices, vertex_count));
            }

            if any_tex_coords {
                if mesh.texcoords.len() / 2 == vertex_count {
                    tex_coords.extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));
                } else {
                    tex_coords.extend(std::iter::repeat_n([0.0, 0.0], vertex_count));
                }
            }

            data.indices.extend(mesh.indices.iter().map(|i| i + offset));
        }

        if data.indices.is_empty() {
            bail!("{} contains no triangles", name);
        }
        if let Some(bad) = data.indices.iter().find(|&&i| i as usize >= data.positions.len()) {
            bail!(
                "{} references vertex {} but only has {}",
                name,
                bad,
                data.positions.len()
            );
        }
        if any_tex_coords {
            data.tex_coords = Some(tex_coords);
        }
        Ok(data)
    }

    pub fn has_tex_coords(&self) -> bool {
        self.tex_coords.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Area-weighted vertex normals for meshes exported without them.
fn smooth_normals(positions: &[f32], indices: &[u32], vertex_count: usize) -> Vec<[f32; 3]> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vector3::new(positions[i], positions[i + 1], positions[i + 2])
    };
    let mut normals = vec![Vector3::zero(); vertex_count];
    for c in indices.chunks_exact(3) {
        let (p0, p1, p2) = (vertex(c[0]), vertex(c[1]), vertex(c[2]));
        let face = (p1 - p0).cross(p2 - p0);
        for &i in c {
            normals[i as usize] += face;
        }
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize().into()
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}

pub async fn load_mesh(file_name: &str, scale: f32) -> anyhow::Result<MeshData> {
    let obj_text = load_string(file_name).await?;
    let data = MeshData::parse_obj(file_name, &obj_text, scale).await?;
    log::info!(
        "loaded {} ({} vertices, {} triangles, tex coords: {})",
        file_name,
        data.vertex_count(),
        data.index_count() / 3,
        data.has_tex_coords()
    );
    Ok(data)
}

/// Position, normal, texture-coordinate and index buffers of one mesh.
pub struct GpuMesh {
    pub name: String,
    position_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    tex_coord_buffer: Option<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = |what: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} {} Buffer", data.name, what)),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let position_buffer = vertex_buffer("Position", bytemuck::cast_slice(&data.positions));
        let normal_buffer = vertex_buffer("Normal", bytemuck::cast_slice(&data.normals));
        let tex_coord_buffer = data
            .tex_coords
            .as_ref()
            .map(|tex_coords| vertex_buffer("TexCoord", bytemuck::cast_slice(tex_coords)));

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: data.name.clone(),
            position_buffer,
            normal_buffer,
            tex_coord_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
        }
    }

    pub fn tex_coord_slot(&self) -> TexCoordSlot {
        match self.tex_coord_buffer {
            Some(_) => TexCoordSlot::Enabled,
            None => TexCoordSlot::Disabled,
        }
    }

    /// Select the program variant for this mesh and bind its buffers.
    ///
    /// The texture-coordinate slot is re-decided on every call because the
    /// program's slots are shared by whatever mesh is drawn next.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>, program: &ShaderProgram) {
        program.activate(render_pass, self.tex_coord_slot());
        render_pass.set_vertex_buffer(VertexSlots::POSITION, self.position_buffer.slice(..));
        render_pass.set_vertex_buffer(VertexSlots::NORMAL, self.normal_buffer.slice(..));
        let tex_coords = self
            .tex_coord_buffer
            .as_ref()
            .unwrap_or_else(|| program.disabled_tex_coords());
        render_pass.set_vertex_buffer(VertexSlots::TEX_COORDS, tex_coords.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}
