//! Compile-time constants and the [`DemoConfig`] value that carries them.
//!
//! Nothing here is read from the command line or the environment. The window
//! size, world size and warp tuning are fixed at build time; [`DemoConfig`]
//! exists so the loop state can be constructed with different values in tests.

use glam::Vec3;

/// Window title.
pub const TITLE: &str = "WarpCubes";
/// Window width in pixels.
pub const WIDTH: u32 = 1200;
/// Window height in pixels.
pub const HEIGHT: u32 = 800;

/// Side length of one periodic world cell.
pub const WORLD_SIZE: f32 = 10.0;
/// Number of lattice repetitions on each side of the origin cell, per axis.
pub const LATTICE_REPEAT: i32 = 3;

/// Field of view while cruising, in degrees.
pub const FOV_NORMAL: f32 = 60.0;
/// Field of view at full warp, in degrees.
pub const FOV_WARP: f32 = 160.0;
/// Warp field-of-view ramp rate, in degrees per second of warp time.
pub const FOV_INC_RATE: f32 = 0.8;
/// Recovery runs this many times faster than the ramp-up.
pub const FOV_RECOVERY_FACTOR: f32 = 10.0;
/// Two forward presses closer than this (seconds) engage the warp drive.
pub const DOUBLE_TAP_WINDOW: f32 = 0.2;
/// Translation multiplier applied to forward motion while warping.
pub const WARP_SPEED_FACTOR: f32 = 2.0;

/// Camera speed used by the loop, in units per second.
pub const CRUISE_SPEED: f32 = 10.0;

/// Near clipping plane.
pub const NEAR: f32 = 0.1;
/// Far clipping plane.
pub const FAR: f32 = 100.0;

/// Surface colour of every cube.
pub const OBJECT_COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.31);
/// Colour of the point light.
pub const LIGHT_COLOR: Vec3 = Vec3::ONE;
/// Distance of the headlamp in front of the camera.
pub const LIGHT_LEAD: f32 = 2.0;

/// Directory the shader programs are loaded from.
pub const SHADER_DIR: &str = "shaders";

/// Tunables for [`AppState`](crate::AppState).
#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    pub width: u32,
    pub height: u32,
    pub world_size: f32,
    pub lattice_repeat: i32,
    pub fov_normal: f32,
    pub fov_warp: f32,
    pub fov_inc_rate: f32,
    pub double_tap_window: f32,
    pub cruise_speed: f32,
    pub camera_start: Vec3,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            world_size: WORLD_SIZE,
            lattice_repeat: LATTICE_REPEAT,
            fov_normal: FOV_NORMAL,
            fov_warp: FOV_WARP,
            fov_inc_rate: FOV_INC_RATE,
            double_tap_window: DOUBLE_TAP_WINDOW,
            cruise_speed: CRUISE_SPEED,
            camera_start: Vec3::new(0.0, 0.0, 3.0),
        }
    }
}

impl DemoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world_size(mut self, world_size: f32) -> Self {
        self.world_size = world_size;
        self
    }

    pub fn lattice_repeat(mut self, repeat: i32) -> Self {
        self.lattice_repeat = repeat;
        self
    }

    pub fn cruise_speed(mut self, speed: f32) -> Self {
        self.cruise_speed = speed;
        self
    }

    pub fn camera_start(mut self, position: impl Into<Vec3>) -> Self {
        self.camera_start = position.into();
        self
    }

    /// Width over height of the (fixed) window.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
