use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use winit::event::{ElementState, VirtualKeyCode};

// free-fly camera; angles are spherical coordinates around the eye
pub struct CameraState {
    pub position: Vector3<f32>,
    pub horizontal_angle: f32,
    // clamped to straight up/down
    pub vertical_angle: f32,
    pub fov_degrees: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 5.0),
            // facing down -z, towards the origin
            horizontal_angle: PI,
            vertical_angle: 0.0,
            fov_degrees: 45.0,
        }
    }
}

impl CameraState {
    pub fn forward(&self) -> Vector3<f32> {
        let (h, v) = (self.horizontal_angle, self.vertical_angle);
        Vector3::new(v.cos() * h.sin(), v.sin(), v.cos() * h.cos())
    }

    // always horizontal
    pub fn right(&self) -> Vector3<f32> {
        let h = self.horizontal_angle - FRAC_PI_2;
        Vector3::new(h.sin(), 0.0, h.cos())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.right().cross(&self.forward())
    }

    /// Turns by a cursor movement of `(dx, dy)` pixels.
    pub fn look(&mut self, dx: f32, dy: f32, dt: f32, sensitivity: f32) {
        // moving the mouse right turns right, which is a smaller angle
        self.horizontal_angle -= sensitivity * dt * dx;
        self.vertical_angle =
            (self.vertical_angle - sensitivity * dt * dy).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn advance(&mut self, input: &MoveInput, dt: f32, speed: f32) {
        let step = dt * speed;
        let (forward, right, up) = (self.forward(), self.right(), self.up());
        let axis = |pos: bool, neg: bool| (pos as u8 as f32) - (neg as u8 as f32);
        self.position += forward * axis(input.forward, input.back) * step;
        self.position += right * axis(input.right, input.left) * step;
        self.position += up * axis(input.rise, input.sink) * step;
    }

    /// Scrolling up zooms in.
    pub fn scroll(&mut self, yoffset: f32) {
        self.fov_degrees = (self.fov_degrees - 5.0 * yoffset).clamp(1.0, 120.0);
    }

    pub fn view(&self) -> Matrix4<f32> {
        let eye = Point3::from(self.position);
        Matrix4::look_at_rh(&eye, &(eye + self.forward()), &self.up())
    }

    pub fn projection(&self, aspect: f32) -> Matrix4<f32> {
        Perspective3::new(aspect, self.fov_degrees.to_radians(), 0.1, 100.0).to_homogeneous()
    }
}

/// Which movement keys are currently held.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub rise: bool,
    pub sink: bool,
}

impl MoveInput {
    pub fn input(&mut self, state: ElementState, code: VirtualKeyCode) {
        let c = match state {
            ElementState::Pressed => true,
            ElementState::Released => false,
        };
        match code {
            VirtualKeyCode::W => self.forward = c,
            VirtualKeyCode::S => self.back = c,
            VirtualKeyCode::A => self.left = c,
            VirtualKeyCode::D => self.right = c,
            VirtualKeyCode::Q => self.rise = c,
            VirtualKeyCode::E => self.sink = c,
            _ => {}
        }
    }
}
