use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use point_scene::cli::Cli;
use point_scene::config::SceneConfig;
use point_scene::core::{
    AssetLoader, KeyAction, RecordingDevice, SurfaceReconfigured, WgpuDevice, WinitKeyboard,
};
use point_scene::input::decode;
use point_scene::loaders::load_points_file;
use point_scene::scene::SceneController;
use point_scene::traits::{EventSink, SceneEvent};

/// Delivers loader completions into the winit event loop
struct ProxySink(EventLoopProxy<SceneEvent>);

impl EventSink for ProxySink {
    fn send(&self, event: SceneEvent) {
        if self.0.send_event(event).is_err() {
            log::debug!("Event loop closed, dropping loader event");
        }
    }

    fn clone_box(&self) -> Box<dyn EventSink> {
        Box::new(ProxySink(self.0.clone()))
    }
}

struct App {
    config: SceneConfig,
    data_path: Option<PathBuf>,
    proxy: EventLoopProxy<SceneEvent>,
    keyboard: WinitKeyboard,
    window: Option<Arc<Window>>,
    scene: Option<SceneController<WgpuDevice>>,
}

impl App {
    fn new(config: SceneConfig, data_path: Option<PathBuf>, proxy: EventLoopProxy<SceneEvent>) -> Self {
        Self {
            config,
            data_path,
            proxy,
            keyboard: WinitKeyboard::new(),
            window: None,
            scene: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Point Scene")
                .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let device = match WgpuDevice::new(window.clone(), self.config.clear_color) {
            Ok(device) => device,
            Err(e) => {
                log::error!("Failed to initialize graphics device: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let loader = AssetLoader::new(Box::new(ProxySink(self.proxy.clone())));
        let mut scene = SceneController::new(device, &self.config)
            .with_loader(loader)
            .with_data_path(self.data_path.clone());

        let size = window.inner_size();
        scene.resize(size.width, size.height);
        scene.populate_models(&self.config.models);
        if self.data_path.is_some() {
            scene.request_data_load();
        }

        self.window = Some(window);
        self.scene = Some(scene);
        self.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::ModifiersChanged(modifiers) => self.keyboard.set_modifiers(&modifiers),
            WindowEvent::KeyboardInput { event, .. } => match self.keyboard.process_key(&event) {
                Some(KeyAction::Quit) => event_loop.exit(),
                Some(KeyAction::Press(press)) => {
                    let Some(scene) = &mut self.scene else {
                        return;
                    };
                    let commands = decode(press, &scene.state().steps);
                    let mut needs_render = false;
                    for command in commands {
                        needs_render |= scene.execute(command);
                    }
                    if needs_render {
                        self.request_redraw();
                    }
                }
                None => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(scene) = &mut self.scene {
                    scene.device_mut().resize(size.width, size.height);
                    scene.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let retry = match &mut self.scene {
                    Some(scene) => match scene.render() {
                        Ok(_) => false,
                        Err(e) if SurfaceReconfigured::is_cause_of(&e) => {
                            log::debug!("Frame dropped: {:#}", e);
                            true
                        }
                        Err(e) => {
                            log::error!("Render error: {:#}", e);
                            false
                        }
                    },
                    None => false,
                };
                if retry {
                    self.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SceneEvent) {
        let needs_render = match &mut self.scene {
            Some(scene) => scene.handle_event(event),
            None => false,
        };
        if needs_render {
            self.request_redraw();
        }
    }
}

/// Load the data synchronously and render one frame into a recording device
fn run_headless(config: &SceneConfig, data_path: Option<PathBuf>) -> Result<()> {
    let mut scene = SceneController::new(RecordingDevice::new(), config);
    scene.populate_models(&config.models);

    let frame = match data_path {
        Some(path) => {
            let cloud = load_points_file(&path)?;
            scene.on_data_loaded(&cloud.points, &cloud.stats)?
        }
        None => scene.render()?,
    };

    log::info!("Headless frame: {:?}", frame);
    println!(
        "Rendered {} models ({} drawn, {} skipped) with {} draw calls",
        frame.models, frame.drawn, frame.skipped, frame.draw_calls
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.scene_config()?;

    if cli.headless {
        return run_headless(&config, cli.data);
    }

    let event_loop = EventLoop::<SceneEvent>::with_user_event().build()?;
    let mut app = App::new(config, cli.data, event_loop.create_proxy());

    println!(
        "Point Scene - Controls: WASD/Space move, X/Y/Z rotate, S squeeze, O/F/P projection, \
         C orbit, H raise eye, V fovy, B near plane, 1 light, L reload, Shift reverses, Escape quits"
    );
    event_loop.run_app(&mut app)?;

    Ok(())
}
