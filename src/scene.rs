//! Scene state read by the render loop.
//!
//! The scene is owned by the application and handed to the renderer by
//! reference every frame. Input handling mutates it only through the setters
//! below, so the render step always sees a consistent snapshot.

use cgmath::{Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::{
    config::{DemoConfig, ProjectionConfig},
    input::SliderId,
};

// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Lighting coefficients tuned by the sliders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
    pub ambient_coeff: f32,
    /// Linear attenuation coefficient.
    pub c1: f32,
    /// Quadratic attenuation coefficient.
    pub c2: f32,
    pub light_outer: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            ambient_coeff: 1.0,
            c1: 0.0001,
            c2: 0.0,
            light_outer: 1.0,
        }
    }
}

impl SceneParams {
    /// The ambient slider reports an offset around the neutral coefficient.
    pub fn set_ambient_offset(&mut self, offset: f32) {
        self.ambient_coeff = offset + 1.0;
    }

    pub fn set_c1(&mut self, c1: f32) {
        self.c1 = c1;
    }

    pub fn set_c2(&mut self, c2: f32) {
        self.c2 = c2;
    }

    pub fn set_light_outer(&mut self, value: f32) {
        self.light_outer = value;
    }

    /// Route a slider value to the coefficient it controls.
    pub fn apply(&mut self, slider: SliderId, value: f32) {
        match slider {
            SliderId::Ambient => self.set_ambient_offset(value),
            SliderId::C1 => self.set_c1(value),
            SliderId::C2 => self.set_c2(value),
            SliderId::LightOuter => self.set_light_outer(value),
        }
    }
}

/// Horizontal (about Y) and vertical (about X) angles of the mesh in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Rotation {
    pub fn rotate(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal += horizontal;
        self.vertical += vertical;
    }

    pub fn angles(&self) -> [f32; 2] {
        [self.horizontal, self.vertical]
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub params: SceneParams,
    pub rotation: Rotation,
    model_offset: Vector3<f32>,
    projection: Matrix4<f32>,
}

impl Scene {
    /// Build the scene for a drawable of `width` x `height` pixels.
    ///
    /// The projection is fixed from here on; later resizes do not touch it.
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        Self {
            params: config.initial_params,
            rotation: Rotation::default(),
            model_offset: config.model_offset.into(),
            projection: projection_matrix(&config.projection, width, height),
        }
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        model_matrix(self.model_offset, self.rotation)
    }

    pub fn normal_matrix(&self) -> Matrix3<f32> {
        normal_matrix(&self.model_matrix())
    }
}

pub fn projection_matrix(config: &ProjectionConfig, width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Rad(config.fovy), aspect, config.znear, config.zfar)
}

/// Translate first, then rotate about Y, then about X.
pub fn model_matrix(offset: Vector3<f32>, rotation: Rotation) -> Matrix4<f32> {
    Matrix4::from_translation(offset)
        * Matrix4::from_angle_y(Rad(rotation.horizontal))
        * Matrix4::from_angle_x(Rad(rotation.vertical))
}

/// Inverse-transpose of the upper 3x3 of `model`.
///
/// A singular model matrix has no normal matrix; identity is used instead so
/// the frame can still be drawn.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    match upper.invert() {
        Some(inverse) => inverse.transpose(),
        None => {
            log::warn!("model matrix is singular, falling back to an identity normal matrix");
            Matrix3::identity()
        }
    }
}
