//! Render pipelines: the bump lighting program and the mip chain blitter.

pub mod mipmap;
pub mod program;
