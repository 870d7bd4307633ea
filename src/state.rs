//! Everything the render loop mutates, in one place.
//!
//! [`AppState`] owns the camera, the held-key table, the warp drive, the cube
//! field and the display toggles. The window layer pushes timestamped input
//! events into a queue; once per frame [`AppState::frame`] drains that queue,
//! advances the simulation and hands back a [`FrameParams`] describing what to
//! draw. Nothing in here touches the GPU, so the whole loop can be driven from
//! tests with synthetic events and timestamps.

use std::fmt;

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::camera::{Camera, Movement, ZOOM_MAX};
use crate::config::{
    DemoConfig, FAR, LIGHT_COLOR, LIGHT_LEAD, NEAR, OBJECT_COLOR, TITLE, WARP_SPEED_FACTOR,
};
use crate::input::{InputEvent, KeyAction, KeyTable, TimedEvent};
use crate::warp::WarpDrive;
use crate::world::World;

/// Which of the two lit-cube programs is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadingMode {
    /// Per-fragment lighting.
    #[default]
    Phong,
    /// Per-vertex lighting.
    Gouraud,
}

impl ShadingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Phong => Self::Gouraud,
            Self::Gouraud => Self::Phong,
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phong => write!(f, "Phong"),
            Self::Gouraud => write!(f, "Gouraud"),
        }
    }
}

/// Polygon rasterisation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolygonMode {
    #[default]
    Filled,
    Wireframe,
}

impl PolygonMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Filled => Self::Wireframe,
            Self::Wireframe => Self::Filled,
        }
    }
}

impl fmt::Display for PolygonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => write!(f, "filled"),
            Self::Wireframe => write!(f, "wireframe"),
        }
    }
}

/// Key bindings.
pub mod keys {
    use winit::keyboard::KeyCode;

    pub const QUIT: KeyCode = KeyCode::Escape;
    pub const FORWARD: KeyCode = KeyCode::KeyW;
    pub const BACKWARD: KeyCode = KeyCode::KeyS;
    pub const LEFT: KeyCode = KeyCode::KeyA;
    pub const RIGHT: KeyCode = KeyCode::KeyD;
    pub const TOGGLE_WIREFRAME: KeyCode = KeyCode::F1;
    pub const TOGGLE_SHADING: KeyCode = KeyCode::F2;
}

const MOVEMENT_KEYS: [(KeyCode, Movement); 4] = [
    (keys::FORWARD, Movement::Forward),
    (keys::BACKWARD, Movement::Backward),
    (keys::LEFT, Movement::Left),
    (keys::RIGHT, Movement::Right),
];

/// Per-frame values the renderer needs.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_pos: Vec3,
    pub light_pos: Vec3,
    pub object_color: Vec3,
    pub light_color: Vec3,
    /// Effective vertical field of view in degrees (warp fov scaled by zoom).
    pub fov: f32,
    pub shading: ShadingMode,
    pub polygon: PolygonMode,
    /// One model matrix per cube instance.
    pub instances: &'a [Mat4],
}

/// Process-wide demo state, owned by the loop.
pub struct AppState {
    config: DemoConfig,
    camera: Camera,
    keys: KeyTable,
    focused: bool,
    warp: WarpDrive,
    world: World,
    shading: ShadingMode,
    polygon: PolygonMode,
    close_requested: bool,
    last_frame: f32,
    instances: Vec<Mat4>,
}

impl AppState {
    pub fn new(config: DemoConfig) -> Self {
        let camera = Camera::new(config.camera_start, Vec3::Y).speed(config.cruise_speed);
        let warp = WarpDrive::new(&config);
        let world = World::new(config.world_size, config.lattice_repeat);
        let instances = Vec::with_capacity(world.instance_count());

        Self {
            config,
            camera,
            keys: KeyTable::new(),
            focused: true,
            warp,
            world,
            shading: ShadingMode::default(),
            polygon: PolygonMode::default(),
            close_requested: false,
            last_frame: 0.0,
            instances,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn warp(&self) -> &WarpDrive {
        &self.warp
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn shading(&self) -> ShadingMode {
        self.shading
    }

    pub fn polygon(&self) -> PolygonMode {
        self.polygon
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys.key_down(key)
    }

    /// Apply one input event that arrived at `time`.
    pub fn handle_event(&mut self, event: InputEvent, time: f32) {
        match event {
            InputEvent::Key { key, action } => self.handle_key(key, action, time),
            InputEvent::MouseMotion { dx, dy } => {
                // Device motion keeps flowing while another window has focus.
                if self.focused {
                    self.camera.rotate(dx, dy, true);
                }
            }
            InputEvent::Scroll { delta } => self.camera.zoom(delta),
            InputEvent::FocusChanged { focused } => self.set_focused(focused, time),
            InputEvent::CloseRequested => self.close_requested = true,
        }
    }

    /// Losing focus drops every held key, since their releases go to the
    /// other window, and shuts the warp drive down with them.
    fn set_focused(&mut self, focused: bool, time: f32) {
        self.focused = focused;
        if !focused {
            self.keys.clear();
            if self.warp.forward_released(time) {
                tracing::info!("warp drive disengaged on focus loss");
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, action: KeyAction, time: f32) {
        // A press of a key already held is a repeat, not a new edge.
        if !self.keys.apply(key, action) {
            return;
        }

        match (key, action) {
            (keys::QUIT, KeyAction::Press) => {
                tracing::info!("quit requested");
                self.close_requested = true;
            }
            (keys::FORWARD, KeyAction::Press) => {
                if self.warp.forward_pressed(time) {
                    tracing::info!("warp drive engaged");
                }
            }
            (keys::FORWARD, KeyAction::Release) => {
                if self.warp.forward_released(time) {
                    tracing::info!("warp drive disengaged");
                }
            }
            (keys::TOGGLE_WIREFRAME, KeyAction::Press) => {
                self.polygon = self.polygon.toggled();
                tracing::info!(mode = %self.polygon, "polygon mode switched");
            }
            (keys::TOGGLE_SHADING, KeyAction::Press) => {
                self.shading = self.shading.toggled();
                tracing::info!(model = %self.shading, "shading model switched");
            }
            _ => {}
        }
    }

    /// Apply held movement keys for `dt` seconds, then wrap the camera back
    /// into the origin cell.
    pub fn apply_movement(&mut self, dt: f32) {
        for (key, movement) in MOVEMENT_KEYS {
            if !self.keys.key_down(key) {
                continue;
            }
            let step = if movement == Movement::Forward && self.warp.is_engaged() {
                dt * WARP_SPEED_FACTOR
            } else {
                dt
            };
            self.camera.translate(movement, step);
        }
        self.camera.position = self.world.wrap(self.camera.position);
    }

    /// Run one frame at `now` seconds since startup: drain `events`, move,
    /// update the warp fov and build the draw parameters.
    pub fn frame(
        &mut self,
        events: impl IntoIterator<Item = TimedEvent>,
        now: f32,
    ) -> FrameParams<'_> {
        let dt = (now - self.last_frame).max(0.0);
        self.last_frame = now;

        for TimedEvent { time, event } in events {
            self.handle_event(event, time);
        }

        self.apply_movement(dt);
        self.warp.update(now);

        let fov = self.effective_fov();
        let projection = Mat4::perspective_rh(fov.to_radians(), self.config.aspect(), NEAR, FAR);
        self.world.fill_instances(now, &mut self.instances);

        FrameParams {
            view: self.camera.view_matrix(),
            projection,
            view_pos: self.camera.position,
            light_pos: self.camera.position + LIGHT_LEAD * self.camera.forward(),
            object_color: OBJECT_COLOR,
            light_color: LIGHT_COLOR,
            fov,
            shading: self.shading,
            polygon: self.polygon,
            instances: &self.instances,
        }
    }

    /// Warp fov narrowed by the camera zoom.
    pub fn effective_fov(&self) -> f32 {
        self.warp.fov() * (self.camera.zoom_angle() / ZOOM_MAX)
    }

    /// Window title reflecting the current modes.
    pub fn status_line(&self) -> String {
        format!(
            "{TITLE} | {} | {} | fov {:.0}\u{b0}{}",
            self.shading,
            self.polygon,
            self.effective_fov(),
            if self.warp.is_engaged() { " | WARP" } else { "" }
        )
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}
