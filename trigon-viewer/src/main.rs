// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod window;

use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard as kb,
};

use trigon_assets::{AssetDirs, AssetError, AssetKind};
use trigon_vulkan::pipeline::ShaderBlobs;
use trigon_vulkan::prelude::*;

use window::ViewerWindow;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Window title, also reported to the driver as the application name
    #[arg(long, default_value = "Simple Vulkan program")]
    title: String,

    /// Enable validation layers and driver message logging
    #[arg(long, action = ArgAction::Set, default_value_t = cfg!(debug_assertions))]
    validation: bool,

    /// Vertex shader asset name
    #[arg(long, default_value = "triangle/vertex")]
    vertex: String,

    /// Fragment shader asset name
    #[arg(long, default_value = "triangle/fragment")]
    fragment: String,
}

#[derive(thiserror::Error, Debug)]
enum ViewerError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("shader {name}: {source}")]
    Shader {
        name: String,
        #[source]
        source: AssetError,
    },

    #[error(transparent)]
    Setup(#[from] SetupError),
}

impl ViewerError {
    fn exit_code(&self) -> u8 {
        match self {
            ViewerError::EventLoop(_) | ViewerError::Window(_) => 1,
            ViewerError::Shader { .. } => FailureClass::Resource.exit_code(),
            ViewerError::Setup(e) => e.exit_code(),
        }
    }
}

fn load_shaders(args: &Args) -> Result<ShaderBlobs, ViewerError> {
    let assets = AssetDirs::new();
    let load = |name: &str| {
        assets
            .find_bytes(name, AssetKind::Shader)
            .map_err(|source| ViewerError::Shader {
                name: name.to_owned(),
                source,
            })
    };
    Ok(ShaderBlobs {
        vertex: load(&args.vertex)?,
        fragment: load(&args.fragment)?,
    })
}

struct App {
    args: Args,
    // Declared before the window so it is dropped first.
    lifecycle: Option<Lifecycle<VkContext>>,
    window: Option<ViewerWindow>,
    outcome: Result<(), ViewerError>,
}

impl App {
    fn new(args: Args) -> Self {
        Self {
            args,
            lifecycle: None,
            window: None,
            outcome: Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window = ViewerWindow::new(
            event_loop,
            &self.args.title,
            self.args.width,
            self.args.height,
        )?;
        let window = self.window.insert(window);

        // Shaders are read before any Vulkan object exists.
        let shaders = load_shaders(&self.args)?;

        let config = SetupConfig::default()
            .with_app_name(&self.args.title)
            .with_diagnostics(self.args.validation);
        let gpu = VkContext::load()?;
        let lifecycle = self.lifecycle.insert(Lifecycle::new(gpu, config));
        lifecycle.setup(&*window, &shaders)?;
        Ok(())
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let (Some(window), Some(lifecycle)) = (self.window.as_mut(), self.lifecycle.as_mut()) {
            window.request_close();
            lifecycle.poll(&*window);
        }
        event_loop.exit();
    }

    /// Tear down before the window goes away and report how the run ended.
    fn finish(mut self) -> Result<(), ViewerError> {
        if let Some(mut lifecycle) = self.lifecycle.take() {
            lifecycle.teardown();
        }
        self.window = None;
        self.outcome
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Setup happens once.  Later resumes find the window already there.
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.outcome = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.repeat && event.state == ElementState::Pressed {
                    match event.physical_key {
                        kb::PhysicalKey::Code(kb::KeyCode::KeyQ)
                        | kb::PhysicalKey::Code(kb::KeyCode::Escape) => self.close(event_loop),
                        _ => {}
                    }
                }
            }
            WindowEvent::CloseRequested => self.close(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {}
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: Args) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    // Nothing animates, so only wake for events.
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = App::new(args);
    let ran = event_loop.run_app(&mut app);
    let outcome = app.finish();
    ran?;
    outcome
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    info!(
        "{} {}x{}, validation {}",
        args.title, args.width, args.height, args.validation
    );

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
