//! # WarpCubes
//!
//! **A field of spinning lit cubes you can fly through, with a warp drive.**
//!
//! Ten cubes are placed in a cell of side 10 and that cell repeats on a
//! 7 × 7 × 7 lattice, so 3430 cubes are drawn every frame. The camera wraps
//! around the cell, which makes the field feel endless.
//!
//! ## Controls
//!
//! | Input        | Action                                      |
//! |--------------|---------------------------------------------|
//! | W A S D      | Move forward / left / back / right          |
//! | W W (quick)  | Engage warp: double speed, widening fov     |
//! | Mouse        | Look around                                 |
//! | Scroll       | Zoom                                        |
//! | F1           | Toggle wireframe                            |
//! | F2           | Toggle Phong / Gouraud shading              |
//! | Esc          | Quit                                        |
//!
//! ## Running
//!
//! ```no_run
//! fn main() -> Result<(), warpcubes::RunError> {
//!     warpcubes::run()
//! }
//! ```
//!
//! The loop state is independent of the window and GPU, so it can be driven
//! directly:
//!
//! ```
//! use warpcubes::{AppState, InputEvent, KeyCode, TimedEvent};
//!
//! let mut state = AppState::default();
//! let events = [TimedEvent { time: 0.0, event: InputEvent::press(KeyCode::KeyW) }];
//! let frame = state.frame(events, 0.5);
//! assert_eq!(frame.instances.len(), 3430);
//! ```
//!
//! Shader programs are read from `shaders/` and reloaded when the files change.

mod app;
mod camera;
pub mod config;
mod cube_pass;
mod gpu;
mod input;
mod mesh;
mod shader;
mod state;
mod warp;
mod world;

pub use app::{RunError, run, run_with_config};
pub use camera::{Camera, Movement};
pub use config::DemoConfig;
pub use cube_pass::{CubePass, InstanceRaw, SceneUniforms};
pub use gpu::{GpuContext, GpuError};
pub use input::{EventQueue, InputEvent, KeyAction, KeyTable, TimedEvent};
pub use mesh::{CubeMesh, Vertex};
pub use shader::{HotShader, ProgramSource, ShaderError};
pub use state::{AppState, FrameParams, PolygonMode, ShadingMode, keys};
pub use warp::WarpDrive;
pub use world::World;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;
