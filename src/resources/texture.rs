use anyhow::Context;
use futures::channel::oneshot;

use crate::{
    data_structures::texture::Texture, pipelines::mipmap::MipmapGenerator,
    resources::load_binary,
};

/// Colour shown until the real bump map has been decoded: 3/4 grey, opaque.
pub const PLACEHOLDER_RGBA: [u8; 4] = {
    let grey = (3 * 255 / 4) as u8;
    [grey, grey, grey, 255]
};

type Decoded = anyhow::Result<image::RgbaImage>;

/// The bump map bound to group 1 of the lighting program.
///
/// Starts out as a 1x1 placeholder. The image is fetched and decoded in the
/// background and swapped in by [`BumpTexture::poll`] on the render thread,
/// so the handle held by the renderer never changes.
pub struct BumpTexture {
    pub name: String,
    texture: Texture,
    bind_group: wgpu::BindGroup,
    pending: Option<oneshot::Receiver<Decoded>>,
}

impl BumpTexture {
    /// A texture that only ever shows the placeholder colour.
    pub fn placeholder(
        name: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let texture = Texture::solid(device, queue, PLACEHOLDER_RGBA, &format!("{} (placeholder)", name));
        let bind_group = create_bind_group(device, layout, &texture, name)?;
        Ok(Self {
            name: name.to_string(),
            texture,
            bind_group,
            pending: None,
        })
    }

    /// Bind the placeholder now and start loading `file_name` in the background.
    pub fn load(
        file_name: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        #[cfg(not(target_arch = "wasm32"))] runtime: &tokio::runtime::Handle,
    ) -> anyhow::Result<Self> {
        let mut texture = Self::placeholder(file_name, device, queue, layout)?;

        let (tx, rx) = oneshot::channel();
        let owned_name = file_name.to_string();
        let task = async move {
            let decoded = decode_image(&owned_name).await;
            // the receiver is gone when the demo shut down before decoding finished
            let _ = tx.send(decoded);
        };
        #[cfg(not(target_arch = "wasm32"))]
        runtime.spawn(task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);

        texture.pending = Some(rx);
        Ok(texture)
    }

    /// Swap in the decoded image if it has arrived.
    ///
    /// Called once per frame. Returns `true` on the frame the real texture
    /// gets bound. Failures are logged and leave the placeholder in place.
    pub fn poll(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        mipmaps: &MipmapGenerator,
    ) -> bool {
        let Some(rx) = self.pending.as_mut() else {
            return false;
        };
        let decoded = match rx.try_recv() {
            Ok(None) => return false,
            Ok(Some(decoded)) => decoded,
            Err(oneshot::Canceled) => Err(anyhow::anyhow!("decoder task was dropped")),
        };
        self.pending = None;

        match decoded.and_then(|img| self.replace(device, queue, layout, &img, mipmaps)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("keeping placeholder for {}: {:#}", self.name, e);
                false
            }
        }
    }

    /// Upload `img` and bind it in place of the current texture.
    ///
    /// On error the current texture stays bound.
    pub fn replace(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        img: &image::RgbaImage,
        mipmaps: &MipmapGenerator,
    ) -> anyhow::Result<()> {
        let texture = Texture::from_image(device, queue, img, &self.name, mipmaps)?;
        self.bind_group = create_bind_group(device, layout, &texture, &self.name)?;
        self.texture = texture;
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Size of the currently bound texture in texels.
    pub fn size(&self) -> [u32; 2] {
        self.texture.size()
    }
}

/// Fetch and decode an image, flipped so that row 0 is the bottom row.
pub async fn decode_image(file_name: &str) -> Decoded {
    let bytes = load_binary(file_name).await?;
    let img = image::load_from_memory(&bytes).with_context(|| format!("cannot decode {}", file_name))?;
    Ok(img.flipv().to_rgba8())
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    name: &str,
) -> anyhow::Result<wgpu::BindGroup> {
    let sampler = texture
        .sampler
        .as_ref()
        .with_context(|| format!("{} was created without a sampler", name))?;
    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(name),
    }))
}
