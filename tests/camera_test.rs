use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Deg, MetricSpace, Point3};
use clip_viewer::{
    camera::{Camera, CameraController, CameraUniform, Projection},
    ViewerConfig,
};

fn stage() -> (Camera, CameraController, Projection) {
    let config = ViewerConfig::default();
    let camera = Camera::from_config(&config.camera);
    let mut controller = CameraController::new(config.orbit.clone());
    controller.resize(600);
    let projection = Projection::new(800, 600, Deg(config.camera.fovy_degrees), 1.0, 1000.0);
    (camera, controller, projection)
}

#[test]
fn spherical_coordinates_round_trip() {
    let camera = Camera::new([400.0, 200.0, 0.0], [0.0, 0.0, 0.0]);
    assert!((camera.radius - 200_000.0_f32.sqrt()).abs() < 1e-3);
    assert!((camera.theta - FRAC_PI_2).abs() < 1e-5);
    assert!(camera.position().distance(Point3::new(400.0, 200.0, 0.0)) < 1e-2);
}

#[test]
fn zoom_is_clamped_to_distance_limits() {
    let (mut camera, mut controller, _) = stage();

    controller.dolly(-500.0);
    controller.update_camera(&mut camera);
    assert_eq!(camera.radius, 2000.0);

    controller.dolly(500.0);
    controller.update_camera(&mut camera);
    assert_eq!(camera.radius, 100.0);
}

#[test]
fn camera_never_goes_below_the_horizon() {
    let (mut camera, mut controller, _) = stage();

    controller.rotate(0.0, -6000.0);
    for _ in 0..10 {
        controller.update_camera(&mut camera);
        assert!(camera.phi <= FRAC_PI_2);
    }
    assert!((camera.phi - FRAC_PI_2).abs() < 1e-6);
    assert!(camera.position().y >= -1e-3);

    controller.rotate(0.0, 6000.0);
    for _ in 0..10 {
        controller.update_camera(&mut camera);
    }
    assert!(camera.phi > 0.0 && camera.phi < PI);
}

#[test]
fn damping_spreads_input_over_frames() {
    let (mut camera, mut controller, _) = stage();
    let start = camera.theta;
    let total = -60.0 * 2.0 * PI / 600.0;

    controller.rotate(60.0, 0.0);
    controller.update_camera(&mut camera);
    let first = camera.theta - start;
    assert!((first - total * 0.05).abs() < 1e-5);

    controller.update_camera(&mut camera);
    let second = camera.theta - start - first;
    assert!((second - total * 0.95 * 0.05).abs() < 1e-5);
    assert!(second.abs() < first.abs());
}

#[test]
fn panning_stays_on_the_ground_plane() {
    let (mut camera, mut controller, projection) = stage();
    controller.pan(&camera, projection.fovy(), 30.0, 45.0);
    for _ in 0..50 {
        controller.update_camera(&mut camera);
    }
    assert!(camera.target.y.abs() < 1e-4);
    assert!(camera.target.x.abs() > 1.0 || camera.target.z.abs() > 1.0);
}

#[test]
fn projection_tracks_aspect_ratio() {
    let (camera, _, mut projection) = stage();
    assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    projection.resize(1000, 0);
    assert_eq!(projection.aspect(), 1000.0);

    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);
    assert!((uniform.view_position[0] - 400.0).abs() < 1e-2);
    assert_eq!(uniform.view_position[3], 1.0);
}
