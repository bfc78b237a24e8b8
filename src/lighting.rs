//! CPU mirror of the fragment lighting in `pipelines/bump.wgsl`.
//!
//! The GPU never calls into this module. It exists so the lighting formula
//! can be evaluated and checked on the host with literal vectors; any change to
//! the shader math has to be made in both places.

use cgmath::{ElementWise, InnerSpace, MetricSpace, Vector3, Vector4};

use crate::{config::LightConfig, scene::SceneParams};

/// Exponent of the specular highlight.
pub const SHININESS: f32 = 16.0;

/// Distance falloff `1 / (1 + c1*d + c2*d^2)`.
pub fn attenuation(distance: f32, c1: f32, c2: f32) -> f32 {
    1.0 / (1.0 + c1 * distance + c2 * distance * distance)
}

/// RGBA samples around the current texel, one texel step away on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbours {
    pub left: Vector4<f32>,
    pub right: Vector4<f32>,
    /// `v + step`
    pub up: Vector4<f32>,
    /// `v - step`
    pub bottom: Vector4<f32>,
}

/// Finite differences `(left - right, bottom - up)` of the height samples.
pub fn bump_gradient(samples: &Neighbours) -> (Vector4<f32>, Vector4<f32>) {
    (samples.left - samples.right, samples.bottom - samples.up)
}

/// Offset the normalized surface normal by the gradient.
///
/// Only `x_grad.x` and `y_grad.y` are used and the result is deliberately left
/// unnormalized, so strong gradients can push the lighting above 1.
pub fn perturb_normal(
    normal: Vector3<f32>,
    x_grad: Vector4<f32>,
    y_grad: Vector4<f32>,
) -> Vector3<f32> {
    let n = normal.normalize();
    Vector3::new(n.x + x_grad.x, n.y + y_grad.y, n.z)
}

/// GLSL/WGSL `reflect`: `i - 2 * dot(n, i) * n`.
pub fn reflect(incident: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

/// A shaded point in view space. The viewer sits at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub position: Vector3<f32>,
    /// Already perturbed normal, see [`perturb_normal`].
    pub normal: Vector3<f32>,
}

/// Intermediate scalars of the lighting model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingTerms {
    pub distance: f32,
    pub attenuation: f32,
    pub diffuse: f32,
    pub specular: f32,
}

pub fn lighting_terms(fragment: &Fragment, light: &LightConfig, params: &SceneParams) -> LightingTerms {
    let light_position = Vector3::from(light.position);
    let distance = light_position.distance(fragment.position);
    let dir_to_light = (light_position - fragment.position).normalize();
    let reflected = reflect(-dir_to_light, fragment.normal).normalize();
    let dir_to_view = (-fragment.position).normalize();

    let diffuse = fragment.normal.dot(dir_to_light).max(0.0);
    let specular = reflected.dot(dir_to_view).max(0.0).powf(SHININESS);

    LightingTerms {
        distance,
        attenuation: attenuation(distance, params.c1, params.c2),
        diffuse,
        specular,
    }
}

/// Final colour of `fragment`, alpha fixed at 1.
pub fn shade(
    fragment: &Fragment,
    light: &LightConfig,
    params: &SceneParams,
    base_colour: Vector3<f32>,
) -> Vector4<f32> {
    let terms = lighting_terms(fragment, light, params);
    let ambient = Vector3::from(light.ambient_colour) * params.ambient_coeff;
    let direct = (Vector3::from(light.diffuse_colour) * terms.diffuse
        + Vector3::from(light.specular_colour) * terms.specular)
        * terms.attenuation
        * params.light_outer;
    let rgb = (ambient + direct).mul_element_wise(base_colour);
    rgb.extend(1.0)
}
