use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use image::{ImageBuffer, Rgba};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use blackhole_rs::camera::OrbitCamera;
use blackhole_rs::input::{parse_key, Action, PointerEvent};
use blackhole_rs::physics::Diagnostics;
use blackhole_rs::{load_config, RenderBackend, SceneConfig, SceneRenderer, SoftwareBackend};

/// Pixel scroll deltas (touchpads) per wheel notch
const PIXELS_PER_LINE: f64 = 40.0;
const STATS_INTERVAL: u32 = 30;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

#[derive(Parser)]
#[command(name = "blackhole-rs")]
#[command(version = "0.1.0")]
#[command(about = "Pixelated black hole with a lensed star field and diagnostics overlay")]
struct Cli {
    /// Scene configuration file (YAML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Framebuffer width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Framebuffer height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Render this many frames without a window and write them as PNG
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,

    /// Output directory for headless frames
    #[arg(long, default_value = "frames")]
    out: PathBuf,

    /// Seed for the ring and disk jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

struct FrameStats {
    last: Instant,
    frames: u32,
    total_frames: u64,
    time_sum_ms: f32,
}

impl FrameStats {
    fn new() -> Self {
        FrameStats {
            last: Instant::now(),
            frames: 0,
            total_frames: 0,
            time_sum_ms: 0.0,
        }
    }

    fn record(&mut self, diagnostics: &Diagnostics) {
        let now = Instant::now();
        self.time_sum_ms += now.duration_since(self.last).as_secs_f32() * 1000.0;
        self.last = now;
        self.frames += 1;
        self.total_frames += 1;

        if self.frames >= STATS_INTERVAL {
            let avg = self.time_sum_ms / self.frames as f32;
            log::debug!(
                "[Frame {:<6}] {:.2} ms/frame ({:.1} FPS)",
                self.total_frames,
                avg,
                1000.0 / avg
            );
            for line in diagnostics.lines() {
                log::debug!("  {}", line);
            }
            self.frames = 0;
            self.time_sum_ms = 0.0;
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: SceneRenderer<SoftwareBackend>,
    camera: OrbitCamera,
    cursor: (f64, f64),
    stats: FrameStats,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(renderer: SceneRenderer<SoftwareBackend>, camera: OrbitCamera) -> Self {
        App {
            window: None,
            pixels: None,
            renderer,
            camera,
            cursor: (0.0, 0.0),
            stats: FrameStats::new(),
            error: None,
        }
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.renderer.backend().size();
        let attrs = Window::default_attributes()
            .with_title("blackhole-rs: lensed star field")
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels = Pixels::new(size.width, size.height, surface)
            .context("failed to create pixel surface")?;
        self.resize_backend(size.width, size.height);

        self.window = Some(window);
        self.pixels = Some(pixels);
        Ok(())
    }

    fn resize_backend(&mut self, width: u32, height: u32) {
        let backend = self.renderer.backend_mut();
        backend.resize(width, height);
        if backend.star_layer().is_none() {
            if let Err(e) = backend.create_star_layer() {
                log::error!("Failed to create star layer: {}", e);
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(pixels) = self.pixels.as_mut() {
            if let Err(e) = pixels.resize_surface(width, height) {
                log::error!("Failed to resize surface: {}", e);
                return;
            }
            if let Err(e) = pixels.resize_buffer(width, height) {
                log::error!("Failed to resize buffer: {}", e);
                return;
            }
        }
        self.resize_backend(width, height);
        log::info!("Resized to {}x{}", width, height);
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        match action {
            Action::Quit => event_loop.exit(),
            Action::ToggleAutoRotate => {
                self.camera.toggle_auto_rotate();
            }
            Action::None => {}
            other => {
                if let Some(delta) = other.config_delta() {
                    self.renderer.apply(delta);
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.camera.tick();
        let diagnostics = self.renderer.render_frame(&self.camera);

        if let Some(pixels) = self.pixels.as_mut() {
            self.renderer.backend().copy_to(pixels.frame_mut());
            if let Err(e) = pixels.render() {
                log::error!("Failed to present frame: {}", e);
                event_loop.exit();
                return;
            }
        }
        self.stats.record(&diagnostics);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_surface(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => {
                let action = parse_key(key_code);
                if !repeat || action.repeats() {
                    self.handle_action(event_loop, action);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => PointerEvent::Pressed {
                        x: self.cursor.0,
                        y: self.cursor.1,
                    },
                    ElementState::Released => PointerEvent::Released,
                };
                self.camera.handle_pointer(event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                self.camera.handle_pointer(PointerEvent::Moved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                self.camera.handle_pointer(PointerEvent::Scrolled { lines });
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

fn save_frame(path: &Path, width: u32, height: u32, rgba: Vec<u8>) -> anyhow::Result<()> {
    let img = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", width, height))?;
    img.save(path)
        .with_context(|| format!("failed to save {}", path.display()))
}

fn run_headless(
    mut renderer: SceneRenderer<SoftwareBackend>,
    mut camera: OrbitCamera,
    frames: u32,
    out: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    camera.auto_rotate = true;

    let (width, height) = renderer.backend().size();
    let start = Instant::now();
    for i in 0..frames {
        camera.tick();
        let diagnostics = renderer.render_frame(&camera);
        let path = out.join(format!("frame_{:04}.png", i));
        save_frame(&path, width, height, renderer.backend().read_pixels())?;
        log::info!("{} | {}", path.display(), diagnostics.lines().join(" | "));
    }

    let elapsed = start.elapsed().as_secs_f32();
    if frames > 0 {
        log::info!(
            "Rendered {} frames in {:.2}s ({:.2} ms/frame)",
            frames,
            elapsed,
            elapsed * 1000.0 / frames as f32
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SceneConfig::default(),
    };
    log::info!(
        "Black hole radius {} at {:?}, disc resolution {}, point size {}",
        config.black_hole.radius,
        config.black_hole.position,
        config.black_hole.resolution,
        config.black_hole.point_size
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let camera = OrbitCamera::new(&config.camera);
    let backend = SoftwareBackend::new(cli.width, cli.height);
    let renderer = SceneRenderer::new(backend, config, &mut rng);

    if let Some(frames) = cli.headless {
        return run_headless(renderer, camera, frames, &cli.out);
    }

    println!("=== blackhole-rs ===");
    println!("Resolution: {}x{}", cli.width, cli.height);
    println!("Controls:");
    println!("  Left drag: Orbit camera");
    println!("  Scroll: Zoom");
    println!("  R: Toggle auto-rotate");
    println!("  Up/Down: Black hole disc resolution");
    println!("  +/-: Point size");
    println!("  Escape: Quit");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(renderer, camera);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
