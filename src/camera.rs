//! A first-person free-fly camera driven by incremental quaternion rotations.
//!
//! [`Camera`] keeps an explicit forward/up/right basis instead of yaw and pitch
//! angles. Mouse look rotates the forward vector with unit quaternions (first
//! about the camera's right axis, then about the world up axis), and after every
//! rotation the right and up vectors are re-derived from cross products. The
//! basis therefore never shrinks as the view approaches the poles, which is
//! what happens when forward is rebuilt from accumulated Euler angles.
//!
//! # Example
//!
//! ```
//! use warpcubes::{Camera, Movement};
//!
//! let mut camera = Camera::default();
//! camera.translate(Movement::Forward, 1.0);
//! camera.rotate(40.0, -12.0, true);
//! let view = camera.view_matrix();
//! # let _ = view;
//! ```

use glam::{Mat4, Quat, Vec3};

/// Default movement speed in units per second.
pub const SPEED: f32 = 3.0;
/// Default mouse sensitivity in degrees per pixel.
pub const SENSITIVITY: f32 = 0.25;
/// Widest zoom angle in degrees (also the starting zoom).
pub const ZOOM_MAX: f32 = 45.0;
/// Narrowest zoom angle in degrees.
pub const ZOOM_MIN: f32 = 1.0;
/// Elevation limit applied by [`Camera::rotate`] when pitch is constrained.
pub const PITCH_LIMIT: f32 = 89.0;

/// Keyboard movement directions, independent of any windowing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Camera position and orthonormal orientation basis.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y)
    }
}

impl Camera {
    /// Create a camera at `position` looking down -Z, with `world_up` as the
    /// reference up axis.
    pub fn new(position: impl Into<Vec3>, world_up: impl Into<Vec3>) -> Self {
        let mut camera = Self {
            position: position.into(),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: world_up.into().normalize(),
            speed: SPEED,
            sensitivity: SENSITIVITY,
            zoom: ZOOM_MAX,
        };
        camera.update_basis();
        camera
    }

    /// Set the movement speed.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the mouse sensitivity (degrees per pixel).
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Current zoom angle in degrees, within `[ZOOM_MIN, ZOOM_MAX]`.
    pub fn zoom_angle(&self) -> f32 {
        self.zoom
    }

    /// Move along the current basis by `speed * dt`.
    pub fn translate(&mut self, direction: Movement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            Movement::Forward => self.position += self.forward * velocity,
            Movement::Backward => self.position -= self.forward * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Mouse look from pixel offsets. Positive `y_offset` looks up, positive
    /// `x_offset` turns right.
    ///
    /// With `constrain_pitch` the vertical part is limited so the view never
    /// rises or dips more than [`PITCH_LIMIT`] degrees from the horizon, which
    /// keeps forward from lining up with the world up axis.
    pub fn rotate(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        let yaw = x_offset * self.sensitivity;
        let mut pitch = y_offset * self.sensitivity;

        if constrain_pitch {
            let elevation = self.elevation();
            pitch = (elevation + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT) - elevation;
        }

        let axis = self.forward.cross(self.up).normalize();
        self.rotate_forward(pitch, axis);
        self.rotate_forward(-yaw, self.world_up);
    }

    /// Scroll zoom; positive offsets narrow the view.
    pub fn zoom(&mut self, scroll_offset: f32) {
        self.zoom = (self.zoom - scroll_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Look-at transform from the position toward `position + forward`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    /// Angle of forward above the plane perpendicular to world up, in degrees.
    pub fn elevation(&self) -> f32 {
        self.forward
            .dot(self.world_up)
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
    }

    fn rotate_forward(&mut self, angle_degrees: f32, axis: Vec3) {
        if angle_degrees != 0.0 {
            let rotation = Quat::from_axis_angle(axis, angle_degrees.to_radians());
            self.forward = (rotation * self.forward).normalize();
        }
        self.update_basis();
    }

    fn update_basis(&mut self) {
        self.right = self.forward.cross(self.world_up).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    fn assert_orthonormal(camera: &Camera) {
        let (f, u, r) = (camera.forward(), camera.up(), camera.right());
        assert!((f.length() - 1.0).abs() < EPS, "|forward| = {}", f.length());
        assert!((u.length() - 1.0).abs() < EPS, "|up| = {}", u.length());
        assert!((r.length() - 1.0).abs() < EPS, "|right| = {}", r.length());
        assert!(f.dot(u).abs() < EPS);
        assert!(f.dot(r).abs() < EPS);
        assert!(u.dot(r).abs() < EPS);
    }

    #[test]
    fn default_basis() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::ZERO);
        assert!(approx(camera.forward(), Vec3::NEG_Z));
        assert!(approx(camera.up(), Vec3::Y));
        assert!(approx(camera.right(), Vec3::X));
        assert_eq!(camera.zoom_angle(), ZOOM_MAX);
        assert_orthonormal(&camera);
    }

    #[test]
    fn forward_one_second_at_speed_three() {
        let mut camera = Camera::default();
        camera.translate(Movement::Forward, 1.0);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn translate_each_direction() {
        let mut camera = Camera::default().speed(2.0);
        camera.translate(Movement::Right, 0.5);
        assert!(approx(camera.position, Vec3::new(1.0, 0.0, 0.0)));
        camera.translate(Movement::Left, 1.0);
        assert!(approx(camera.position, Vec3::new(-1.0, 0.0, 0.0)));
        camera.translate(Movement::Backward, 1.0);
        assert!(approx(camera.position, Vec3::new(-1.0, 0.0, 2.0)));
    }

    #[test]
    fn translations_sum_along_basis_at_time_of_call() {
        let mut camera = Camera::default();
        let mut expected = Vec3::ZERO;
        let steps = [
            (Movement::Forward, 0.3, 10.0, 0.0),
            (Movement::Right, 0.1, -25.0, 8.0),
            (Movement::Backward, 0.7, 3.0, -4.0),
            (Movement::Left, 0.0, 0.0, 0.0),
            (Movement::Forward, 1.2, 60.0, 20.0),
        ];
        for (direction, dt, dx, dy) in steps {
            let axis = match direction {
                Movement::Forward => camera.forward(),
                Movement::Backward => -camera.forward(),
                Movement::Left => -camera.right(),
                Movement::Right => camera.right(),
            };
            expected += axis * camera.speed * dt;
            camera.translate(direction, dt);
            camera.rotate(dx, dy, true);
        }
        assert!(approx(camera.position, expected));
    }

    #[test]
    fn look_up_raises_forward() {
        let mut camera = Camera::default().sensitivity(1.0);
        camera.rotate(0.0, 30.0, true);
        assert!(camera.forward().y > 0.0);
        assert!((camera.elevation() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn positive_x_offset_turns_right() {
        let mut camera = Camera::default().sensitivity(1.0);
        camera.rotate(90.0, 0.0, true);
        assert!(approx(camera.forward(), Vec3::X));
        assert!(approx(camera.right(), Vec3::Z));
        assert!(approx(camera.up(), Vec3::Y));
    }

    #[test]
    fn rotate_preserves_orthonormality() {
        let mut camera = Camera::default();
        for i in 0..2000 {
            let x = ((i * 37) % 101) as f32 - 50.0;
            let y = ((i * 53) % 67) as f32 - 33.0;
            camera.rotate(x, y, true);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn pitch_is_constrained_near_the_pole() {
        let mut camera = Camera::default().sensitivity(1.0);
        for _ in 0..50 {
            camera.rotate(0.0, 10.0, true);
        }
        assert!((camera.elevation() - PITCH_LIMIT).abs() < 1e-2);
        assert_orthonormal(&camera);

        for _ in 0..50 {
            camera.rotate(3.0, -10.0, true);
        }
        assert!((camera.elevation() + PITCH_LIMIT).abs() < 1e-2);
        assert_orthonormal(&camera);
    }

    #[test]
    fn unconstrained_pitch_applies_raw_angle() {
        let mut camera = Camera::default().sensitivity(1.0);
        camera.rotate(0.0, 60.0, false);
        camera.rotate(0.0, 20.0, false);
        assert!((camera.elevation() - 80.0).abs() < 1e-2);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut camera = Camera::default();
        camera.zoom(50.0);
        assert_eq!(camera.zoom_angle(), ZOOM_MIN);
        for _ in 0..5 {
            camera.zoom(3.0);
            assert_eq!(camera.zoom_angle(), ZOOM_MIN);
        }

        camera.zoom(-100.0);
        assert_eq!(camera.zoom_angle(), ZOOM_MAX);
        for _ in 0..5 {
            camera.zoom(-3.0);
            assert_eq!(camera.zoom_angle(), ZOOM_MAX);
        }

        camera.zoom(4.5);
        assert!((camera.zoom_angle() - 40.5).abs() < 1e-5);
    }

    #[test]
    fn view_matrix_maps_target_onto_negative_z() {
        let camera = Camera::new([1.0, 2.0, 3.0], Vec3::Y);
        let view = camera.view_matrix();
        let eye = view.transform_point3(camera.position);
        let ahead = view.transform_point3(camera.position + camera.forward() * 5.0);
        assert!(approx(eye, Vec3::ZERO));
        assert!(approx(ahead, Vec3::new(0.0, 0.0, -5.0)));
    }
}
