//! Windowed viewer: winit event loop, renderer, gestures and UI controls.
//!
//! Controls:
//! - `Space` toggles formed/chaos
//! - `F` fires the focus trigger
//! - `P` pauses and resumes
//! - left drag orbits, wheel zooms, hovering a photo outlines it
//! - `Escape` quits

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::clock::FrameClock;
use crate::config::SceneConfig;
use crate::error::AppError;
use crate::gesture::{GesturePipeline, GestureStatus, NoCamera, ScriptedTracker};
use crate::gpu::Renderer;
use crate::input::{Input, KeyCode, MouseButton};
use crate::scene::Scene;

const TITLE: &str = "Yule Tree";
/// Frames between title refreshes.
const TITLE_REFRESH_FRAMES: u64 = 30;

/// Where hand landmarks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    /// A real camera. Without a capture backend this degrades immediately.
    #[default]
    Camera,
    /// A built-in scripted performance.
    Demo,
    /// Gestures off; UI controls only.
    Off,
}

/// Open a window and run until it is closed.
pub fn run(config: SceneConfig, gestures: GestureMode) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, gestures)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    scene: Scene,
    gestures: GesturePipeline,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: Input,
    clock: FrameClock,
    shown_status: Option<GestureStatus>,
    shown_paused: bool,
    /// First fatal error raised inside the event loop.
    error: Option<AppError>,
}

impl App {
    fn new(config: SceneConfig, mode: GestureMode) -> Result<Self, AppError> {
        let gesture_config = config.gesture;
        let gestures = match mode {
            GestureMode::Camera => GesturePipeline::start(NoCamera::open(), gesture_config),
            GestureMode::Demo => GesturePipeline::start(Ok(ScriptedTracker::demo()), gesture_config),
            GestureMode::Off => GesturePipeline::disabled("disabled", gesture_config),
        };
        let scene = Scene::new(config)?;

        Ok(Self {
            scene,
            gestures,
            window: None,
            renderer: None,
            input: Input::new(),
            clock: FrameClock::new(),
            shown_status: None,
            shown_paused: false,
            error: None,
        })
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let sizes: Vec<usize> = self.scene.groups().iter().map(|g| g.len()).collect();
        let mut renderer = pollster::block_on(Renderer::new(window.clone(), &sizes))?;
        self.scene.upload_colors(&mut renderer);

        let size = renderer.size();
        self.input.set_window_size(size.width, size.height);
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn apply_controls(&mut self, aspect: f32) {
        let input = &self.input;
        if input.key_pressed(KeyCode::Space) {
            self.scene.toggle_mode();
        }
        if input.key_pressed(KeyCode::F) {
            self.scene.signal_mut().fire_focus();
        }
        if input.key_pressed(KeyCode::P) {
            self.clock.toggle_pause();
            log::info!("clock {}", if self.clock.is_paused() { "paused" } else { "resumed" });
        }

        let dragging = input.mouse_held(MouseButton::Left);
        if dragging {
            let d = input.mouse_delta();
            self.scene.camera_mut().drag(d.x, d.y);
        }
        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            self.scene.camera_mut().scroll(scroll);
        }

        let pointer = if dragging { None } else { input.pointer() };
        self.scene.hover_at(pointer, aspect);
    }

    fn update_title(&mut self) {
        let status = self.gestures.status();
        let paused = self.clock.is_paused();
        let changed = self.shown_status.as_ref() != Some(status) || self.shown_paused != paused;
        if !changed && (paused || self.clock.frame() % TITLE_REFRESH_FRAMES != 0) {
            return;
        }
        if let Some(window) = &self.window {
            let gestures = match status {
                GestureStatus::Active => "gestures on".to_string(),
                GestureStatus::Degraded(reason) => format!("gestures off ({reason})"),
            };
            let title = if paused {
                format!("{TITLE} | {gestures} | paused")
            } else {
                format!("{TITLE} | {gestures} | {:.0} fps", self.clock.fps())
            };
            window.set_title(&title);
        }
        self.shown_status = Some(status.clone());
        self.shown_paused = paused;
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(aspect) = self.renderer.as_ref().map(Renderer::aspect) else {
            return;
        };

        let (time, dt) = self.clock.tick();
        self.gestures.pump(self.scene.signal_mut());
        self.apply_controls(aspect);
        self.scene.frame(dt, time);
        self.input.begin_frame();
        self.update_title();

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        self.scene.submit(renderer);
        match renderer.render(self.scene.camera(), self.scene.tree_rotation(), time) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { .. } if self.input.key_pressed(KeyCode::Escape) => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                self.input.set_window_size(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.gestures.shutdown();
        log::info!("viewer closed");
    }
}

