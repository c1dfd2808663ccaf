//! Fixed perspective camera and a trackball that spins the model under it.

use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use crate::config::DemoConfig;

/// Radians of rotation for a drag spanning the full canvas height.
const ROTATE_SPEED: f32 = std::f32::consts::PI;

/// Perspective camera on the +Z axis looking at the origin.
#[derive(Clone, Debug)]
pub struct Camera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Camera {
    pub fn new(config: &DemoConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
            distance: config.camera_distance,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Accumulated model rotation driven by pointer drags.
#[derive(Clone, Debug, Default)]
pub struct Trackball {
    rotation: Quat,
}

impl Trackball {
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Applies a drag of `delta` pixels on a viewport `height` pixels tall.
    ///
    /// Dragging right spins the model about the screen's vertical axis and
    /// dragging down about its horizontal axis, like a ball under the finger.
    pub fn drag(&mut self, delta: Vec2, height: f32) {
        let len = delta.length();
        if len == 0.0 || height <= 0.0 {
            return;
        }
        // Screen y grows downward.
        let axis = Vec3::new(delta.y, delta.x, 0.0) / len;
        let angle = len / height * ROTATE_SPEED;
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// Normal matrix for the model; a pure rotation is its own.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }
}
