use clip_viewer::{
    config::{hex_to_clear_colour, hex_to_linear},
    resources::{
        import::MaterialData,
        mesh::{cone, cone_field_instances},
    },
    ViewerConfig,
};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn hex_colours_are_linearised() {
    assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
    assert_eq!(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]);

    let [r, g, b] = hex_to_linear(0x808080);
    assert!((r - 0.2158605).abs() < 1e-5);
    assert_eq!(r, g);
    assert_eq!(g, b);

    let [r, g, b] = hex_to_linear(0x002288);
    assert_eq!(r, 0.0);
    assert!(g > 0.0 && g < b);

    let clear = hex_to_clear_colour(0x323b40);
    assert_eq!(clear.a, 1.0);
    assert!(clear.r < clear.g && clear.g < clear.b);
}

#[test]
fn defaults_describe_the_stage() {
    let config = ViewerConfig::default();
    assert_eq!(config.default_asset, "Offensive Idle");
    assert_eq!(config.camera.position, [400.0, 200.0, 0.0]);
    assert_eq!(config.orbit.min_distance, 100.0);
    assert_eq!(config.orbit.max_distance, 2000.0);
    assert_eq!(config.orbit.max_polar_angle, std::f32::consts::FRAC_PI_2);
    assert_eq!(config.cones.count, 30);
    assert_eq!(config.fog_density, 0.002);
}

#[test]
fn cone_has_flat_faces() {
    let mesh = cone(50.0, 150.0, 4, MaterialData::flat_phong(0x211370));
    assert_eq!(mesh.vertices.len(), 4 * 2 * 3);
    assert_eq!(mesh.indices.len(), mesh.vertices.len());
    assert!(mesh.material.flat);

    for triangle in mesh.vertices.chunks(3) {
        assert!(triangle.iter().all(|v| v.normal == triangle[0].normal));
    }
    let heights: Vec<f32> = mesh.vertices.iter().map(|v| v.position[1]).collect();
    assert!(heights.iter().all(|&y| y == 75.0 || y == -75.0));

    let base = &mesh.vertices[3];
    assert!((base.normal[1] + 1.0).abs() < 1e-5);

    let clamped = cone(1.0, 1.0, 1, MaterialData::phong());
    assert_eq!(clamped.vertices.len(), 3 * 2 * 3);
}

#[test]
fn cone_field_is_scattered_on_a_plane() {
    let config = ViewerConfig::default().cones;
    let mut rng = StdRng::seed_from_u64(7);
    let instances = cone_field_instances(&config, &mut rng);

    assert_eq!(instances.len(), config.count);
    for instance in &instances {
        assert_eq!(instance.position.y, config.elevation);
        assert!(instance.position.x.abs() <= config.spread / 2.0);
        assert!(instance.position.z.abs() <= config.spread / 2.0);
    }
}
