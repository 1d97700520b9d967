//! Ringwave - a ring of frequency bars that pulses with the microphone.
//!
//! Each frequency bin of the live input becomes one segment of the ring; louder
//! bins reach further out and blend further toward the end colour.

use std::process::ExitCode;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use clap::Parser;
use ringwave::audio::{request_microphone, SpectrumSampler};
use ringwave::cli::Args;
use ringwave::console::spawn_console;
use ringwave::controls::{
    self, CancelToken, ControlHandle, ControlMessage, ControlQueue, DEFAULT_QUEUE_CAPACITY,
};
use ringwave::error::SetupError;
use ringwave::params::{RenderConfig, VisualParams};
use ringwave::render_loop::{FrameOutcome, RenderLoop};
use ringwave::rendering::RingProgram;

/// Scale change per arrow key press
const SCALE_STEP: f32 = 0.1;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    program: Option<RingProgram>,
    render_loop: Option<RenderLoop<SpectrumSampler>>,

    // Waiting to be handed to the render loop on first resume
    pending: Option<(SpectrumSampler, ControlQueue, VisualParams)>,

    controls: ControlHandle,
    render_config: RenderConfig,

    /// Set when the app stops because something failed
    failure: Option<String>,
}

impl App {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SetupError> {
        let Some((sampler, queue, params)) = self.pending.take() else {
            return Ok(());
        };

        let window_attributes = Window::default_attributes()
            .with_title("Ringwave")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| SetupError::Window(e.to_string()))?,
        );

        let render_loop = RenderLoop::new(
            sampler,
            params,
            queue,
            self.controls.cancel_token().clone(),
        );
        let program = pollster::block_on(RingProgram::new(
            Arc::clone(&window),
            render_loop.bar_count(),
        ))?;

        log::info!("Ringwave is running");
        log::info!("Up/Down: height scale, Left/Right: distance scale, Esc: quit");
        log::info!("Console: start <hex> | end <hex> | height <n> | distance <n> | quit");

        self.window = Some(window);
        self.program = Some(program);
        self.render_loop = Some(render_loop);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, message: String) {
        log::error!("{}", message);
        self.failure = Some(message);
        self.controls.cancel();
        event_loop.exit();
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_loop), Some(program)) = (&mut self.render_loop, &mut self.program) else {
            return;
        };

        match render_loop.frame(program) {
            Ok(FrameOutcome::Stopped) => event_loop.exit(),
            Ok(_) => {}
            Err(e) => self.fail(event_loop, format!("Render error: {}", e)),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Schedule the next iteration
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.to_string());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.controls.cancel(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => self.controls.cancel(),
                KeyCode::ArrowUp => {
                    self.controls.send(ControlMessage::AdjustHeightScale(SCALE_STEP));
                }
                KeyCode::ArrowDown => {
                    self.controls.send(ControlMessage::AdjustHeightScale(-SCALE_STEP));
                }
                KeyCode::ArrowRight => {
                    self.controls.send(ControlMessage::AdjustDistanceScale(SCALE_STEP));
                }
                KeyCode::ArrowLeft => {
                    self.controls.send(ControlMessage::AdjustDistanceScale(-SCALE_STEP));
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(program) = &mut self.program {
                    program.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let analyser_config = args.analyser_config();

    // Microphone consent comes first; nothing runs without it
    let grant = match pollster::block_on(request_microphone(&analyser_config)) {
        Ok(grant) => grant,
        Err(e) => {
            log::error!("Error capturing audio: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Capturing from {} @ {}Hz", grant.device_name, grant.sample_rate_hz);

    let sampler = match SpectrumSampler::new(grant, analyser_config) {
        Ok(sampler) => sampler,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (handle, queue) = controls::channel(DEFAULT_QUEUE_CAPACITY, CancelToken::new());
    spawn_console(handle.clone());

    let mut app = App {
        window: None,
        program: None,
        render_loop: None,
        pending: Some((sampler, queue, args.visual_params())),
        controls: handle,
        render_config: args.render_config(),
        failure: None,
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    if app.failure.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
