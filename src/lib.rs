//! orange-bump
//!
//! A small cross-platform wgpu demo: one sphere, one bump map, one light.
//! The mesh is shaded per pixel with Phong lighting whose normal is nudged by
//! the gradient of a height map, and can be rotated with the keyboard while
//! four sliders tune the ambient term, the attenuation and the light strength.
//! Runs natively in a winit window and in the browser on a `<canvas>`.
//!
//! High-level modules
//! - `app`: event loop, startup sequence and the render loop state machine
//! - `config`: every tunable of the demo in one [`DemoConfig`]
//! - `context`: window, surface, device and depth buffer
//! - `data_structures`: GPU textures and the mip/clamp sampling decision
//! - `input`: key and slider mapping onto the scene
//! - `lighting`: host-side evaluation of the shading formula
//! - `pipelines`: the bump lighting program and the mip chain blitter
//! - `render`: per-frame uniforms and the single indexed draw
//! - `resources`: OBJ mesh and bump map loading
//! - `scene`: lighting coefficients, rotation and matrices
//!

pub mod app;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod input;
pub mod lighting;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use app::run;
pub use config::DemoConfig;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(DemoConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
