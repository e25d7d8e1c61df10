//! Orbit camera, its input controller, and the GPU uniform.
//!
//! The camera orbits a target point on a sphere. Pointer and keyboard input
//! accumulate pending deltas in the [`CameraController`]; every frame
//! [`CameraController::update_camera`] applies a fraction of them (damping),
//! then clamps the result to the configured distance and polar ranges.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::config::{CameraConfig, OrbitConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the polar angle away from the poles, where `look_at` degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Spherical camera position around `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub target: Point3<f32>,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub theta: f32,
    /// Angle from +Y.
    pub phi: f32,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        let position = position.into();
        let target = target.into();
        let offset = position - target;
        let radius = offset.magnitude();
        let (theta, phi) = if radius == 0.0 {
            (0.0, 0.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };
        Self {
            target,
            radius,
            theta,
            phi,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position, config.target)
    }

    pub fn position(&self) -> Point3<f32> {
        let sin_phi = self.phi.sin();
        self.target
            + Vector3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Camera-space +X in world coordinates.
    fn right(&self) -> Vector3<f32> {
        Vector3::new(self.theta.cos(), 0.0, -self.theta.sin())
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[derive(Debug)]
pub struct CameraController {
    config: OrbitConfig,
    rotate_theta: f32,
    rotate_phi: f32,
    pan_offset: Vector3<f32>,
    scale: f32,
    rotating: bool,
    panning: bool,
    cursor: Option<(f64, f64)>,
    viewport_height: f32,
}

impl CameraController {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            rotate_theta: 0.0,
            rotate_phi: 0.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            rotating: false,
            panning: false,
            cursor: None,
            viewport_height: 1.0,
        }
    }

    pub fn resize(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Queues a drag of `dx`/`dy` pixels as rotation.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let per_pixel = 2.0 * PI * self.config.rotate_speed / self.viewport_height;
        self.rotate_theta -= dx * per_pixel;
        self.rotate_phi -= dy * per_pixel;
    }

    /// Queues a pan of `dx`/`dy` pixels. Panning moves along the ground plane
    /// unless screen-space panning is enabled.
    pub fn pan(&mut self, camera: &Camera, fovy: Rad<f32>, dx: f32, dy: f32) {
        let target_distance = camera.radius * (fovy.0 / 2.0).tan();
        let per_pixel = 2.0 * target_distance * self.config.pan_speed / self.viewport_height;
        let right = camera.right();
        let up = if self.config.screen_space_panning {
            right.cross(camera.target - camera.position()).normalize()
        } else {
            Vector3::unit_y().cross(right)
        };
        self.pan_offset += right * (-dx * per_pixel) + up * (dy * per_pixel);
    }

    /// Queues a zoom. Positive `steps` move the camera closer.
    pub fn dolly(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(self.config.zoom_speed);
        self.scale *= factor.powf(steps);
    }

    /// Returns true if the event was consumed as camera input.
    pub fn handle_window_events(
        &mut self,
        camera: &Camera,
        fovy: Rad<f32>,
        event: &WindowEvent,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right | MouseButton::Middle => self.panning = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if let Some((x, y)) = self.cursor.replace(current) {
                    let (dx, dy) = ((current.0 - x) as f32, (current.1 - y) as f32);
                    if self.rotating {
                        self.rotate(dx, dy);
                    } else if self.panning {
                        self.pan(camera, fovy, dx, dy);
                    }
                }
                self.rotating || self.panning
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.dolly(steps);
                true
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let speed = self.config.key_pan_speed;
                let (dx, dy) = match event.physical_key {
                    PhysicalKey::Code(KeyCode::ArrowUp) => (0.0, speed),
                    PhysicalKey::Code(KeyCode::ArrowDown) => (0.0, -speed),
                    PhysicalKey::Code(KeyCode::ArrowLeft) => (speed, 0.0),
                    PhysicalKey::Code(KeyCode::ArrowRight) => (-speed, 0.0),
                    _ => return false,
                };
                self.pan(camera, fovy, dx, dy);
                true
            }
            _ => false,
        }
    }

    /// Applies the damped share of the pending input and enforces the limits.
    pub fn update_camera(&mut self, camera: &mut Camera) {
        let damping = self.config.damping_factor;

        camera.theta += self.rotate_theta * damping;
        camera.phi += self.rotate_phi * damping;
        camera.target += self.pan_offset * damping;
        camera.radius *= self.scale;

        camera.phi = camera
            .phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        camera.radius = camera
            .radius
            .clamp(self.config.min_distance, self.config.max_distance);

        self.rotate_theta *= 1.0 - damping;
        self.rotate_phi *= 1.0 - damping;
        self.pan_offset *= 1.0 - damping;
        self.scale = 1.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
