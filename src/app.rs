use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::audio::Mixer;
use crate::input::{Bindings, Input, RawFrame};
use crate::renderer::Renderer;
use crate::screen::{FixedStep, Screen, ScreenStack};

pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Fixed update rate; drawing floats with the display.
    pub update_hz: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ember2d".to_string(),
            width: 800,
            height: 600,
            update_hz: 60.0,
        }
    }
}

/// The game loop driver: owns the window, renderer, screen stack, input
/// state, and mixer, and feeds them from winit events.
///
/// Keyboard state lands in the raw frame here; a gamepad poller feeds
/// `raw_frame_mut` with button and axis names the bindings recognize.
pub struct App {
    config: WindowConfig,
    renderer: Option<Renderer<'static>>,
    window: Option<Arc<Window>>,
    stack: ScreenStack,
    input: Input,
    bindings: Bindings,
    mixer: Mixer,
    raw: RawFrame,
    step: FixedStep,
    last_frame: Instant,
}

impl App {
    pub fn new(config: WindowConfig, root: Box<dyn Screen>) -> Self {
        let step = FixedStep::new(1.0 / config.update_hz);
        Self {
            config,
            renderer: None,
            window: None,
            stack: ScreenStack::new(root),
            input: Input::new(),
            bindings: Bindings::standard(),
            mixer: Mixer::new(),
            raw: RawFrame::default(),
            step,
            last_frame: Instant::now(),
        }
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    pub fn raw_frame_mut(&mut self) -> &mut RawFrame {
        &mut self.raw
    }

    pub fn renderer(&mut self) -> Option<&mut Renderer<'static>> {
        self.renderer.as_mut()
    }
}

impl ApplicationHandler<()> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        if let Ok(window) = event_loop.create_window(window_attributes) {
            let window = Arc::new(window);
            let size = window.inner_size();
            let surface = instance.create_surface(window.clone()).unwrap();
            self.renderer = Some(Renderer::new(surface, instance, size));
            self.window = Some(window.clone());
            self.last_frame = Instant::now();
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                // Raw key names are the Debug form of the logical key, which
                // is what Bindings::standard binds against.
                let name = format!("{:?}", event.logical_key);
                if event.state.is_pressed() {
                    self.raw.keys.insert(name);
                } else {
                    self.raw.keys.remove(&name);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;

                self.input.poll(&self.raw, &self.bindings);

                let fixed_dt = self.step.step_seconds;
                let stack = &mut self.stack;
                let input = &self.input;
                let mixer = &mut self.mixer;
                self.step
                    .advance(dt, || stack.update(input, mixer, fixed_dt));

                if self.stack.is_empty() {
                    event_loop.exit();
                    return;
                }

                if let Some(renderer) = &mut self.renderer {
                    match self.stack.draw(renderer) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            if let Some(window) = &self.window {
                                renderer.resize(&window.inner_size());
                            }
                        }
                        Err(e) => log::error!("draw failed: {e}"),
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(&new_size);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            _ => (),
        }
    }
}

/// Builds the window and runs the loop until the screen stack empties or
/// the window closes.
pub fn run(config: WindowConfig, root: Box<dyn Screen>) -> anyhow::Result<()> {
    let _ = env_logger::try_init();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, root);
    event_loop.run_app(&mut app)?;
    Ok(())
}
