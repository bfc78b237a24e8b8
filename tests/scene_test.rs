use cgmath::{Matrix3, Matrix4, Point3, Rad, SquareMatrix, Transform, Vector3};
use orange_bump::{
    app::LoopState,
    config::{DemoConfig, LightConfig, SliderConfig},
    input::{Action, InputState, KeyBindings, SliderId, Sliders},
    render::lighting_uniform,
    scene::{Rotation, Scene, model_matrix, normal_matrix},
};

const EPS: f32 = 1e-5;

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn scene() -> Scene {
    Scene::new(&DemoConfig::default(), 800, 600)
}

fn input() -> InputState {
    let config = DemoConfig::default();
    InputState::new(config.rotation_step, &config.sliders)
}

#[test]
fn should_rotate_with_wwa() {
    let mut scene = scene();
    let mut input = input();
    for key in ["w", "w", "a"] {
        assert!(input.on_key(key, &mut scene));
    }
    let [horizontal, vertical] = scene.rotation.angles();
    assert_close(horizontal, -0.1);
    assert_close(vertical, -0.2);
}

#[test]
fn s_and_d_rotate_the_other_way() {
    let mut scene = scene();
    let mut input = input();
    for key in ["s", "d", "d"] {
        input.on_key(key, &mut scene);
    }
    assert_close(scene.rotation.horizontal, 0.2);
    assert_close(scene.rotation.vertical, 0.1);
}

#[test]
fn unbound_keys_change_nothing() {
    let mut scene = scene();
    let mut input = input();
    let before = scene.params;
    for key in ["q", "x", "9", " ", "W", "A", "S", "D"] {
        assert!(!input.on_key(key, &mut scene));
    }
    assert_eq!(scene.rotation, Rotation::default());
    assert_eq!(scene.params, before);
}

#[test]
fn key_bindings_map_rotation_and_slider_keys() {
    let bindings = KeyBindings::new(0.1);
    assert_eq!(
        bindings.action_for("w"),
        Some(Action::Rotate {
            horizontal: 0.0,
            vertical: -0.1
        })
    );
    assert_eq!(
        bindings.action_for("d"),
        Some(Action::Rotate {
            horizontal: 0.1,
            vertical: 0.0
        })
    );
    assert_eq!(
        bindings.action_for("4"),
        Some(Action::Slide {
            slider: SliderId::C1,
            steps: 1
        })
    );
    assert_eq!(
        bindings.action_for("7"),
        Some(Action::Slide {
            slider: SliderId::LightOuter,
            steps: -1
        })
    );
}

#[test]
fn scene_starts_with_reference_coefficients() {
    let params = scene().params;
    assert_eq!(params.ambient_coeff, 1.0);
    assert_eq!(params.c1, 0.0001);
    assert_eq!(params.c2, 0.0);
    assert_eq!(params.light_outer, 1.0);
}

#[test]
fn ambient_slider_is_an_offset() {
    let mut scene = scene();
    let mut input = input();
    input.on_slider(SliderId::Ambient, 0.5, &mut scene);
    assert_close(scene.params.ambient_coeff, 1.5);
    input.on_slider(SliderId::Ambient, -1.0, &mut scene);
    assert_close(scene.params.ambient_coeff, 0.0);
}

#[test]
fn sliders_route_to_their_coefficient() {
    let mut scene = scene();
    let mut input = input();
    input.on_slider(SliderId::C1, 0.005, &mut scene);
    input.on_slider(SliderId::C2, 0.0002, &mut scene);
    input.on_slider(SliderId::LightOuter, 1.5, &mut scene);
    assert_close(scene.params.c1, 0.005);
    assert_close(scene.params.c2, 0.0002);
    assert_close(scene.params.light_outer, 1.5);
    assert_close(scene.params.ambient_coeff, 1.0);
}

#[test]
fn reported_slider_values_pass_through_unchanged() {
    let mut scene = scene();
    let mut input = input();
    input.on_slider(SliderId::C1, 0.05, &mut scene);
    assert_close(scene.params.c1, 0.05);
    assert_close(input.sliders().value(SliderId::C1), 0.05);
    input.on_slider(SliderId::LightOuter, 3.0, &mut scene);
    assert_close(scene.params.light_outer, 3.0);
    input.on_slider(SliderId::Ambient, 2.0, &mut scene);
    assert_close(scene.params.ambient_coeff, 3.0);
}

#[test]
fn number_keys_step_sliders() {
    let mut scene = scene();
    let mut input = input();
    assert!(input.on_key("2", &mut scene));
    assert_close(scene.params.ambient_coeff, 1.1);
    assert!(input.on_key("8", &mut scene));
    assert_close(scene.params.light_outer, 1.1);

    for _ in 0..40 {
        input.on_key("7", &mut scene);
    }
    assert_eq!(scene.params.light_outer, 0.0);
    assert_eq!(input.sliders().value(SliderId::LightOuter), 0.0);
}

#[test]
fn sliders_start_at_their_initial_values() {
    let sliders = Sliders::new(&SliderConfig::default());
    assert_eq!(sliders.value(SliderId::Ambient), 0.0);
    assert_eq!(sliders.value(SliderId::C1), 0.0001);
    assert_eq!(sliders.value(SliderId::C2), 0.0);
    assert_eq!(sliders.value(SliderId::LightOuter), 1.0);
}

#[test]
fn slider_dom_ids_match_the_page() {
    let ids: Vec<_> = SliderId::ALL.iter().map(|id| id.dom_id()).collect();
    assert_eq!(ids, ["myRange", "c1-range", "c2-range", "light-outer-range"]);
}

#[test]
fn model_matrix_translates_before_rotating() {
    let offset = Vector3::new(0.0, 0.0, -80.0);
    let unrotated = model_matrix(offset, Rotation::default());
    assert_eq!(unrotated, Matrix4::from_translation(offset));

    let rotation = Rotation {
        horizontal: std::f32::consts::FRAC_PI_2,
        vertical: 0.0,
    };
    // a point on +x ends up on -z, then gets pushed back by the offset
    let p = model_matrix(offset, rotation).transform_point(Point3::new(1.0, 0.0, 0.0));
    assert_close(p.x, 0.0);
    assert_close(p.y, 0.0);
    assert_close(p.z, -81.0);
}

#[test]
fn normal_matrix_of_rigid_motion_is_its_rotation() {
    let rotation = Rotation {
        horizontal: 0.3,
        vertical: -0.7,
    };
    let model = model_matrix(Vector3::new(0.0, 0.0, -80.0), rotation);
    let expected = Matrix3::from_angle_y(Rad(0.3)) * Matrix3::from_angle_x(Rad(-0.7));
    let normal = normal_matrix(&model);
    for (col, expected_col) in [(normal.x, expected.x), (normal.y, expected.y), (normal.z, expected.z)]
    {
        assert_close(col.x, expected_col.x);
        assert_close(col.y, expected_col.y);
        assert_close(col.z, expected_col.z);
    }
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let model = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
    let normal = normal_matrix(&model);
    assert_close(normal.x.x, 0.5);
    assert_close(normal.y.y, 0.25);
    assert_close(normal.z.z, 1.0);
}

#[test]
fn singular_model_falls_back_to_identity_normals() {
    let model = Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0);
    assert_eq!(normal_matrix(&model), Matrix3::identity());
}

#[test]
fn projection_is_fixed_after_setup() {
    let mut scene = scene();
    let projection = scene.projection();
    let mut input = input();
    input.on_key("a", &mut scene);
    input.on_slider(SliderId::C1, 0.002, &mut scene);
    assert_eq!(scene.projection(), projection);
}

#[test]
fn uniform_carries_scene_and_light() {
    let mut scene = scene();
    let mut input = input();
    input.on_key("d", &mut scene);
    input.on_slider(SliderId::C2, 0.0005, &mut scene);
    let config = DemoConfig::default();

    let uniform = lighting_uniform(&scene, &config.light, config.object_colour, [256, 128]);
    let expected_proj: [[f32; 4]; 4] = scene.projection().into();
    let expected_model: [[f32; 4]; 4] = scene.model_matrix().into();
    assert_eq!(uniform.proj, expected_proj);
    assert_eq!(uniform.model, expected_model);
    assert_eq!(uniform.light_position, LightConfig::default().position);
    assert_eq!(uniform.light_position, [15.0, 40.0, -60.0]);
    assert_eq!(uniform.ambient_colour, [0.1, 0.1, 0.1]);
    assert_eq!(uniform.diffuse_colour, [0.7, 0.7, 0.7]);
    assert_eq!(uniform.specular_colour, [1.0, 1.0, 1.0]);
    assert_eq!(uniform.object_colour, [1.0, 0.4, 0.0]);
    assert_eq!(uniform.ambient_coeff, 1.0);
    assert_eq!(uniform.c1, 0.0001);
    assert_close(uniform.c2, 0.0005);
    assert_eq!(uniform.light_outer, 1.0);
    assert_eq!(uniform.texture_size, [256.0, 128.0]);
    // padding column of the normal matrix stays zero
    assert!(uniform.normal_matrix.iter().all(|col| col[3] == 0.0));
}

#[test]
fn loop_state_only_draws_once_initialized() {
    let state = LoopState::default();
    assert_eq!(state, LoopState::Uninitialized);
    assert!(!state.can_draw());
    assert_eq!(state.frame_presented(), LoopState::Uninitialized);

    let state = state.initialized();
    assert_eq!(state, LoopState::Ready);
    assert!(state.can_draw());

    let state = state.frame_presented();
    assert_eq!(state, LoopState::Rendering);
    assert_eq!(state.initialized(), LoopState::Rendering);
    assert_eq!(state.frame_presented(), LoopState::Rendering);
}
