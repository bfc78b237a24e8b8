//! GPU-facing data types.
//!
//! - [`texture::Texture`] wraps a wgpu texture, its view and sampler
//! - [`texture::Sampling`] decides between mipmapped and clamped filtering

pub mod texture;
