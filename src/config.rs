//! Runtime settings of the demo.
//!
//! Everything tunable lives in [`DemoConfig`]. The defaults reproduce the
//! reference scene: an orange sphere scaled by 7, pushed 80 units into the
//! screen and lit by a single white light above and behind the viewer.

use std::f32::consts::PI;

use crate::{input::SliderRange, scene::SceneParams};

/// Light position and colours pushed to the shader every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub ambient_colour: [f32; 3],
    pub diffuse_colour: [f32; 3],
    pub specular_colour: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [15.0, 40.0, -60.0],
            ambient_colour: [0.1, 0.1, 0.1],
            diffuse_colour: [0.7, 0.7, 0.7],
            specular_colour: [1.0, 1.0, 1.0],
        }
    }
}

/// Field of view and clip planes. The projection is built once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionConfig {
    /// Vertical field of view in radians.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fovy: PI / 10.0,
            znear: 0.1,
            zfar: 500.0,
        }
    }
}

/// Value ranges of the four lighting sliders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderConfig {
    /// The ambient slider is an offset: the coefficient is `value + 1.0`.
    pub ambient: SliderRange,
    pub c1: SliderRange,
    pub c2: SliderRange,
    pub light_outer: SliderRange,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            ambient: SliderRange::new(-1.0, 1.0, 0.0),
            c1: SliderRange::new(0.0, 0.01, 0.0001),
            c2: SliderRange::new(0.0, 0.001, 0.0),
            light_outer: SliderRange::new(0.0, 2.0, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// OBJ file below `assets/`.
    pub mesh_file: String,
    /// Image below `assets/` used as height map.
    pub bump_file: String,
    /// Uniform scale applied to every mesh position on load.
    pub mesh_scale: f32,
    /// Translation applied before the rotations of the model matrix.
    pub model_offset: [f32; 3],
    /// Flat base colour multiplied with the light weighting.
    pub object_colour: [f32; 3],
    /// Radians added per key press.
    pub rotation_step: f32,
    pub clear_colour: wgpu::Color,
    pub light: LightConfig,
    pub projection: ProjectionConfig,
    pub initial_params: SceneParams,
    pub sliders: SliderConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mesh_file: "sphere.obj".to_string(),
            bump_file: "bump.png".to_string(),
            mesh_scale: 7.0,
            model_offset: [0.0, 0.0, -80.0],
            object_colour: [1.0, 102.0 / 255.0, 0.0],
            rotation_step: 0.1,
            clear_colour: wgpu::Color::BLACK,
            light: LightConfig::default(),
            projection: ProjectionConfig::default(),
            initial_params: SceneParams::default(),
            sliders: SliderConfig::default(),
        }
    }
}
