use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use emu_present::cli::Cli;
use emu_present::config::Config;
use emu_present::core::{
    window_title, FrameDriver, FrameOutcome, PaletteTable, Raster, WindowContext,
};
use emu_present::frame::FrameCounter;

/// Event loop state: the window, the frame driver and the raster producer
struct App {
    config: Config,
    palette: PaletteTable,
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver>,
    raster: Raster,
    frame_counter: FrameCounter,
    modifiers: ModifiersState,
}

impl App {
    fn new(config: Config) -> Self {
        let settings = config.pipeline_settings();
        let raster = Raster::new(settings.mode, settings.raster_width, settings.raster_height);

        Self {
            config,
            palette: PaletteTable::default(),
            window: None,
            driver: None,
            raster,
            frame_counter: FrameCounter::new(),
            modifiers: ModifiersState::empty(),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(driver) = &mut self.driver {
            driver.shutdown();
        }
        self.driver = None;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame_number = self.frame_counter.tick();
        // Test pattern scrolls one texel per frame
        self.raster.test_pattern(frame_number as u32);

        let Some(driver) = &mut self.driver else {
            return;
        };

        match driver.render(&self.raster) {
            Ok(FrameOutcome::Presented(_)) | Ok(FrameOutcome::Skipped) => {}
            Err(e) => {
                log::error!("Render error: {}", e);
                self.shutdown(event_loop);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.config.window;
        let mut attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                window_config.width,
                window_config.height,
            ));
        if window_config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.dimensions();
        let driver = match pollster::block_on(FrameDriver::new(
            window.clone(),
            (size.width, size.height),
            self.config.pipeline_settings(),
            &self.palette,
            self.config.video.vsync,
        )) {
            Ok(driver) => driver,
            Err(e) => {
                log::error!("Failed to initialize presentation: {}", e);
                event_loop.exit();
                return;
            }
        };

        WindowContext::set_title(
            window.as_ref(),
            &window_title(&self.config.window.title, driver.backend()),
        );

        self.window = Some(window);
        self.driver = Some(driver);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Enter | KeyCode::NumpadEnter),
                        repeat: false,
                        ..
                    },
                ..
            } if self.modifiers.alt_key() => {
                if let Some(window) = &self.window {
                    WindowContext::toggle_fullscreen(window.as_ref());
                }
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
                if let Some(driver) = &mut self.driver {
                    driver.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw_if_visible();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::resolve(&cli)?;
    log::info!(
        "{:?} raster, {:?} scaling, magnification {}",
        config.video.mode,
        config.video.scaling,
        config.video.magnification
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    event_loop.run_app(&mut app)?;

    Ok(())
}
