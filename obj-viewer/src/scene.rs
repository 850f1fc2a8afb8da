use nalgebra::{Matrix4, Vector3};

use crate::camera::{CameraState, MoveInput};
use crate::config::ViewerConfig;

// radians per second
pub const ROTATION_SPEED: f32 = 1.0;
// tint cycles per second
pub const COLOR_SPEED: f32 = 0.5;

/// Everything the per-frame update and the event handler both touch.
pub struct Scene {
    pub camera: CameraState,
    pub input: MoveInput,
    // mouse motion since the last frame
    pub look_delta: (f32, f32),
    pub model: Matrix4<f32>,
    color: f32,
    cycle: bool,
    move_speed: f32,
    mouse_sensitivity: f32,
}

impl Scene {
    pub fn new(cfg: &ViewerConfig) -> Self {
        Self {
            camera: CameraState::default(),
            input: MoveInput::default(),
            look_delta: (0.0, 0.0),
            model: Matrix4::identity(),
            color: 0.0,
            cycle: cfg.cycle,
            move_speed: cfg.move_speed,
            mouse_sensitivity: cfg.mouse_sensitivity,
        }
    }

    pub fn mouse_moved(&mut self, dx: f64, dy: f64) {
        self.look_delta.0 += dx as f32;
        self.look_delta.1 += dy as f32;
    }

    pub fn update(&mut self, dt: f32) {
        let (dx, dy) = std::mem::take(&mut self.look_delta);
        self.camera.look(dx, dy, dt, self.mouse_sensitivity);
        self.camera.advance(&self.input, dt, self.move_speed);

        self.model *= Matrix4::from_axis_angle(&Vector3::y_axis(), ROTATION_SPEED * dt);
        if self.cycle {
            self.color += COLOR_SPEED * dt;
        }
    }

    pub fn tint(&self) -> [f32; 3] {
        if !self.cycle {
            return [1.0; 3];
        }
        let c = self.color.rem_euclid(1.0);
        [c, 1.0 - c, c]
    }

    pub fn view_projection(&self, aspect: f32) -> Matrix4<f32> {
        self.camera.projection(aspect) * self.camera.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn model_spins_around_y() {
        let mut scene = Scene::new(&ViewerConfig::default());
        scene.update(std::f32::consts::FRAC_PI_2);
        let p = scene.model.transform_point(&Point3::new(1.0, 2.0, 0.0));
        assert!((p - Point3::new(0.0, 2.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn tint_is_white_unless_cycling() {
        let mut scene = Scene::new(&ViewerConfig::default());
        scene.update(0.5);
        assert_eq!(scene.tint(), [1.0; 3]);
    }

    #[test]
    fn tint_cycles() {
        let cfg = ViewerConfig {
            cycle: true,
            ..Default::default()
        };
        let mut scene = Scene::new(&cfg);
        scene.update(0.5);
        assert_eq!(scene.tint(), [0.25, 0.75, 0.25]);
        // wraps after a full cycle
        scene.update(2.0);
        assert_eq!(scene.tint(), [0.25, 0.75, 0.25]);
    }

    #[test]
    fn mouse_motion_is_consumed_once() {
        let mut scene = Scene::new(&ViewerConfig::default());
        scene.mouse_moved(10.0, 0.0);
        scene.mouse_moved(10.0, 0.0);
        scene.update(1.0);
        let after_first = scene.camera.horizontal_angle;
        assert!((after_first - (std::f32::consts::PI - 1.0)).abs() < 1e-6);
        scene.update(1.0);
        assert_eq!(scene.camera.horizontal_angle, after_first);
    }
}
