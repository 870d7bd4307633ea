use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::config::{DemoConfig, TITLE};
use crate::cube_pass::CubePass;
use crate::gpu::{GpuContext, GpuError};
use crate::input::{EventQueue, InputEvent};
use crate::shader::ShaderError;
use crate::state::AppState;

/// Anything that can end the demo early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("GPU ran out of memory while presenting")]
    OutOfMemory,
}

/// Run the demo with the built-in configuration until the window closes.
pub fn run() -> Result<(), RunError> {
    run_with_config(DemoConfig::default())
}

/// Run the demo with a custom configuration.
pub fn run_with_config(config: DemoConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = WarpApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        WarpApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    cube_pass: CubePass,
    state: AppState,
    events: EventQueue,
    start_time: Instant,
    title: String,
}

enum WarpApp {
    Pending { config: DemoConfig },
    Running(Box<Running>),
    Failed(RunError),
}

impl WarpApp {
    fn start(config: &DemoConfig, event_loop: &ActiveEventLoop) -> Result<Running, RunError> {
        let window_attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let state = AppState::new(config.clone());
        let cube_pass = CubePass::new(&gpu, state.world().instance_count())?;

        grab_cursor(&window);
        tracing::info!(
            width = gpu.width(),
            height = gpu.height(),
            instances = state.world().instance_count(),
            "window ready"
        );

        Ok(Running {
            window,
            gpu,
            cube_pass,
            state,
            events: EventQueue::new(),
            start_time: Instant::now(),
            title: TITLE.to_string(),
        })
    }
}

/// Hide the cursor and keep it inside the window for mouse look.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        tracing::warn!(%err, "cursor grab unavailable");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for WarpApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let WarpApp::Pending { config } = self else {
            return;
        };

        *self = match Self::start(config, event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                WarpApp::Running(Box::new(running))
            }
            Err(err) => {
                tracing::error!(%err, "startup failed");
                event_loop.exit();
                WarpApp::Failed(err)
            }
        };
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        let WarpApp::Running(running) = self else {
            return;
        };

        if let Some(input) = InputEvent::from_device_event(&event) {
            let time = running.start_time.elapsed().as_secs_f32();
            running.events.push(time, input);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let WarpApp::Running(running) = self else {
            return;
        };

        if let Some(input) = InputEvent::from_window_event(&event) {
            let time = running.start_time.elapsed().as_secs_f32();
            running.events.push(time, input);
        }

        match event {
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::Focused(true) => {
                grab_cursor(&running.window);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.redraw() {
                    tracing::error!(%err, "render loop stopped");
                    event_loop.exit();
                    *self = WarpApp::Failed(err);
                    return;
                }
                if running.state.close_requested() {
                    tracing::info!("exit requested");
                    event_loop.exit();
                    return;
                }
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}

impl Running {
    fn redraw(&mut self) -> Result<(), RunError> {
        let now = self.start_time.elapsed().as_secs_f32();
        self.cube_pass.reload_changed(&self.gpu);

        let frame = self.state.frame(self.events.drain(), now);
        match self.cube_pass.render(&self.gpu, &frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RunError::OutOfMemory),
            Err(err) => tracing::warn!(%err, "skipping frame"),
        }

        let status = self.state.status_line();
        if status != self.title {
            self.window.set_title(&status);
            self.title = status;
        }
        Ok(())
    }
}
