use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use arcade_core::{Point, Size};
use arcade_render::{FontVec, SkiaRenderer, find_system_font, load_font, render_icon};
use arcade_session::{SessionConfig, SessionController, SessionEvent};
use arcade_timing::HighPrecisionTimer;
use log::{debug, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Icon, Window, WindowId},
};

use crate::Args;

const ICON_SIZE: u32 = 64;
const FRAME_LOG_INTERVAL: u64 = 600;

/// What a key press means to the app.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Session(SessionEvent),
    Exit,
}

pub fn map_key(code: KeyCode) -> Option<KeyAction> {
    let digit = |n: usize| Some(KeyAction::Session(SessionEvent::TapReflex(n - 1)));
    match code {
        KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter => {
            Some(KeyAction::Session(SessionEvent::Continue))
        }
        KeyCode::Escape => Some(KeyAction::Exit),
        KeyCode::Digit1 | KeyCode::Numpad1 => digit(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => digit(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => digit(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => digit(4),
        KeyCode::Digit5 | KeyCode::Numpad5 => digit(5),
        KeyCode::Digit6 | KeyCode::Numpad6 => digit(6),
        KeyCode::Digit7 | KeyCode::Numpad7 => digit(7),
        KeyCode::Digit8 | KeyCode::Numpad8 => digit(8),
        KeyCode::Digit9 | KeyCode::Numpad9 => digit(9),
        _ => None,
    }
}

fn to_point(position: PhysicalPosition<f64>) -> Point {
    Point::new(position.x as f32, position.y as f32)
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: SessionController<HighPrecisionTimer, Pcg32>,
    renderer: Option<SkiaRenderer>,
    font_path: Option<std::path::PathBuf>,
    icon: Icon,
    windowed: bool,
    cursor: Point,
    frame_clock: HighPrecisionTimer,
    last_frame: Option<Instant>,
    frames: u64,
    should_exit: bool,
}

impl App {
    pub fn new(config: SessionConfig, args: &Args) -> Result<Self> {
        let seed = args.seed.unwrap_or_else(rand::random);
        info!("session seed {seed}");
        let session = SessionController::new(
            config,
            HighPrecisionTimer::new(),
            Pcg32::seed_from_u64(seed),
            Size::new(1280.0, 720.0),
        )
        .context("invalid session config")?;

        let (rgba, width, height) = render_icon(ICON_SIZE)?;
        let icon = Icon::from_rgba(rgba, width, height).context("building window icon")?;

        Ok(Self {
            window: None,
            pixels: None,
            session,
            renderer: None,
            font_path: args.font.clone(),
            icon,
            windowed: args.windowed,
            cursor: Point::new(0.0, 0.0),
            frame_clock: HighPrecisionTimer::new(),
            last_frame: None,
            frames: 0,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            "starting on {} ({}); SPACE to start, ESC to exit",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn load_font(&self) -> Option<FontVec> {
        if let Some(path) = &self.font_path {
            match load_font(path) {
                Ok(font) => return Some(font),
                Err(e) => warn!("{e:#}; trying system fonts"),
            }
        }
        match find_system_font().map(|p| load_font(&p)) {
            Some(Ok(font)) => Some(font),
            Some(Err(e)) => {
                warn!("{e:#}; text will not be drawn");
                None
            }
            None => {
                warn!("no usable font found (pass --font); text will not be drawn");
                None
            }
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());

        let mut attributes = Window::default_attributes()
            .with_title("Reflex Arcade")
            .with_window_icon(Some(self.icon.clone()));
        if self.windowed {
            attributes = attributes.with_inner_size(PhysicalSize::new(1280, 720));
        } else {
            let monitor = monitor.context("no monitor available")?;
            if let Some(mhz) = monitor.refresh_rate_millihertz() {
                info!("refresh rate {:.1} Hz", mhz as f64 / 1000.0);
            }
            attributes = attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
                .with_resizable(false);
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            "surface {}x{} at scale {:.2}",
            size.width,
            size.height,
            window.scale_factor()
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(
            Pixels::new(size.width, size.height, surface).context("creating pixel surface")?,
        );
        let font = self.load_font();
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);
        self.session
            .handle_event(SessionEvent::Resize(Size::new(size.width as f32, size.height as f32)));

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let scene = self.session.scene();
        let stats = renderer.render_frame(&scene, pixels.frame_mut())?;
        pixels.render().context("presenting frame")?;

        let now = Instant::now();
        if let Some(last) = self.last_frame.replace(now) {
            self.frame_clock.record_frame(now - last);
        }
        self.frames += 1;
        if self.frames % FRAME_LOG_INTERVAL == 0 {
            let pacing = self.frame_clock.frame_stats();
            debug!(
                "frame {}: clear {:.3}ms scene {:.3}ms copy {:.3}ms total {:.3}ms, {:.1} fps, jitter {:.3}ms",
                self.frames,
                stats.clear.as_secs_f64() * 1e3,
                stats.scene.as_secs_f64() * 1e3,
                stats.copy.as_secs_f64() * 1e3,
                stats.total.as_secs_f64() * 1e3,
                pacing.effective_fps,
                pacing.jitter_ns / 1e6,
            );
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match map_key(code) {
            Some(KeyAction::Session(event)) => {
                self.session.handle_event(event);
            }
            Some(KeyAction::Exit) => self.cleanup_and_exit(event_loop),
            None => {}
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(size.width, size.height) {
                warn!("failed to resize renderer: {e:#}");
            }
        }
        self.session
            .handle_event(SessionEvent::Resize(Size::new(size.width as f32, size.height as f32)));
        info!("display resized to {}x{}", size.width, size.height);
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        let pacing = self.frame_clock.frame_stats();
        info!(
            "exiting after {} frames, average {:.2}ms, jitter {:.3}ms",
            self.frames,
            pacing.average_frame_time_ns / 1e6,
            pacing.jitter_ns / 1e6
        );
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                log::error!("failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.session.update();
                if let Err(e) = self.render() {
                    log::error!("render failed: {e:#}");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event_loop);
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = to_point(position),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.session.handle_event(SessionEvent::Tap(self.cursor));
            }
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                self.session
                    .handle_event(SessionEvent::Tap(to_point(touch.location)));
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.clone() {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
