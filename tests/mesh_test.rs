use cgmath::{InnerSpace, Vector3};
use futures::executor::block_on;
use orange_bump::resources::mesh::{MeshData, load_mesh};

const QUAD: &str = "\
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

const BARE_TRIANGLE: &str = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

#[test]
fn should_triangulate_and_scale() {
    let mesh = block_on(MeshData::parse_obj("quad.obj", QUAD, 7.0)).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.index_count(), 6);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    for p in &mesh.positions {
        assert_eq!(p[0].abs(), 7.0);
        assert_eq!(p[1].abs(), 7.0);
        assert_eq!(p[2], 0.0);
    }
}

#[test]
fn should_keep_normals_and_tex_coords() {
    let mesh = block_on(MeshData::parse_obj("quad.obj", QUAD, 7.0)).unwrap();
    assert!(mesh.has_tex_coords());
    assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));

    let tex_coords = mesh.tex_coords.as_ref().unwrap();
    assert_eq!(tex_coords.len(), mesh.vertex_count());
    // texture coordinates are not rescaled or flipped
    for (p, t) in mesh.positions.iter().zip(tex_coords) {
        assert_eq!(t[0], (p[0] / 7.0 + 1.0) / 2.0);
        assert_eq!(t[1], (p[1] / 7.0 + 1.0) / 2.0);
    }
}

#[test]
fn mesh_without_tex_coords_disables_the_slot() {
    let mesh = block_on(MeshData::parse_obj("tri.obj", BARE_TRIANGLE, 1.0)).unwrap();
    assert!(!mesh.has_tex_coords());
    assert_eq!(mesh.tex_coords, None);
}

#[test]
fn missing_normals_are_computed() {
    let mesh = block_on(MeshData::parse_obj("tri.obj", BARE_TRIANGLE, 1.0)).unwrap();
    assert_eq!(mesh.normals.len(), mesh.vertex_count());
    for n in &mesh.normals {
        let n = Vector3::from(*n);
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }
}

#[test]
fn empty_obj_is_rejected() {
    assert!(block_on(MeshData::parse_obj("empty.obj", "# nothing here\n", 7.0)).is_err());
}

#[test]
fn out_of_range_faces_are_rejected() {
    let broken = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
    assert!(block_on(MeshData::parse_obj("broken.obj", broken, 1.0)).is_err());
}

#[tokio::test]
async fn should_load_sphere_asset() {
    let mesh = load_mesh("sphere.obj", 7.0).await.unwrap();
    assert!(mesh.has_tex_coords());
    assert_eq!(mesh.index_count() % 3, 0);
    assert_eq!(mesh.normals.len(), mesh.vertex_count());
    for p in &mesh.positions {
        let radius = Vector3::from(*p).magnitude();
        assert!((radius - 7.0).abs() < 1e-3, "vertex at radius {}", radius);
    }
}

#[tokio::test]
async fn missing_mesh_asset_is_an_error() {
    assert!(load_mesh("no-such-mesh.obj", 7.0).await.is_err());
}
