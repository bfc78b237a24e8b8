use orange_bump::pipelines::program::{
    BUMP_SHADER, FRAGMENT_ENTRY, LightingUniform, ShaderError, VERTEX_ENTRY, validate_wgsl,
};

#[test]
fn bump_shader_validates() {
    let module = validate_wgsl("bump.wgsl", BUMP_SHADER).unwrap();
    let names: Vec<_> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
    assert!(names.contains(&VERTEX_ENTRY));
    assert!(names.contains(&FRAGMENT_ENTRY));
}

#[test]
fn should_report_syntax_errors() {
    let err = validate_wgsl("broken.wgsl", "@vertex fn vs_main( -> {").unwrap_err();
    match &err {
        ShaderError::Compile { label, diagnostic } => {
            assert_eq!(label, "broken.wgsl");
            assert!(!diagnostic.is_empty());
        }
        other => panic!("expected a compile error, got {:?}", other),
    }
    assert!(err.to_string().contains("broken.wgsl"));
}

#[test]
fn should_report_type_errors() {
    let source = "fn f() -> f32 { return vec2<f32>(1.0, 2.0); }";
    let err = validate_wgsl("typed.wgsl", source).unwrap_err();
    assert!(matches!(
        err,
        ShaderError::Compile { .. } | ShaderError::Validate { .. }
    ));
}

#[test]
fn should_fail_to_link_without_fragment_stage() {
    let vertex_only = "
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
";
    let err = validate_wgsl("vertex_only.wgsl", vertex_only).unwrap_err();
    match err {
        ShaderError::MissingEntryPoint {
            stage, entry_point, ..
        } => {
            assert_eq!(stage, naga::ShaderStage::Fragment);
            assert_eq!(entry_point, FRAGMENT_ENTRY);
        }
        other => panic!("expected a link error, got {:?}", other),
    }
}

#[test]
fn uniform_struct_matches_wgsl_layout() {
    let module = validate_wgsl("bump.wgsl", BUMP_SHADER).unwrap();
    let (members, span) = module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(name), naga::TypeInner::Struct { members, span }) if name == "Uniforms" => {
                Some((members.clone(), *span))
            }
            _ => None,
        })
        .expect("bump.wgsl declares a Uniforms struct");

    assert_eq!(span as usize, std::mem::size_of::<LightingUniform>());
    assert_eq!(span, 272);

    let rust_offsets = [
        ("proj", std::mem::offset_of!(LightingUniform, proj)),
        ("model", std::mem::offset_of!(LightingUniform, model)),
        ("normal_matrix", std::mem::offset_of!(LightingUniform, normal_matrix)),
        ("light_position", std::mem::offset_of!(LightingUniform, light_position)),
        ("ambient_coeff", std::mem::offset_of!(LightingUniform, ambient_coeff)),
        ("ambient_colour", std::mem::offset_of!(LightingUniform, ambient_colour)),
        ("c1", std::mem::offset_of!(LightingUniform, c1)),
        ("diffuse_colour", std::mem::offset_of!(LightingUniform, diffuse_colour)),
        ("c2", std::mem::offset_of!(LightingUniform, c2)),
        ("specular_colour", std::mem::offset_of!(LightingUniform, specular_colour)),
        ("light_outer", std::mem::offset_of!(LightingUniform, light_outer)),
        ("object_colour", std::mem::offset_of!(LightingUniform, object_colour)),
        ("texture_size", std::mem::offset_of!(LightingUniform, texture_size)),
    ];
    assert_eq!(members.len(), rust_offsets.len());
    for (member, (name, offset)) in members.iter().zip(rust_offsets) {
        assert_eq!(member.name.as_deref(), Some(name));
        assert_eq!(member.offset as usize, offset, "offset of {}", name);
    }
}
