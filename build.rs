use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when the mesh, the bump map or the shader changes.
    println!("cargo:rerun-if-changed=assets");
    println!("cargo:rerun-if-changed=src/pipelines/bump.wgsl");

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if assets_src.exists() {
        copy_items(&[assets_src], out_dir, &copy_options)
            .context("cannot copy assets/ into the build directory")?;
    }

    Ok(())
}
