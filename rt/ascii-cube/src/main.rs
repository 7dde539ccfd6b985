//! ascii_cube - three spinning cubes drawn with characters
//!
//! Controls:
//! - Space: Pause
//! - R: Reset rotation
//! - Q or Escape: Quit
//!
//! Usage:
//!   ascii_cube                       - Glyph texture in a window
//!   ascii_cube --terminal            - Characters in the terminal
//!   ascii_cube --debug [--frames N]  - Write N frames to ./debug as .txt and .png

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use ascii_cube::terminal::{parse_key_event, TerminalDisplay};
use ascii_cube::{window, CubeAnimation, TARGET_FPS};

#[derive(Parser)]
#[command(name = "ascii_cube")]
#[command(version = "0.1.0")]
#[command(about = "Spinning ASCII cubes in a window or the terminal")]
struct Cli {
    /// Render frames to files instead of a window
    #[arg(short, long)]
    debug: bool,

    /// Draw characters in the terminal instead of a window
    #[arg(short, long, conflicts_with = "debug")]
    terminal: bool,

    /// Number of frames written in debug mode
    #[arg(long, default_value_t = 10)]
    frames: u32,

    /// Output directory for debug frames
    #[arg(long, default_value = "debug")]
    out: PathBuf,

    /// Log file used while the terminal view owns the screen
    #[arg(long, default_value = "ascii_cube.log")]
    log_file: PathBuf,
}

fn frame_time() -> Duration {
    Duration::from_secs_f64(1.0 / TARGET_FPS as f64)
}

struct FpsCounter {
    start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        FpsCounter {
            start: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) -> f32 {
        self.frames += 1;
        let elapsed = self.start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            log::debug!("{:.1} FPS", self.fps);
            self.frames = 0;
            self.start = Instant::now();
        }
        self.fps
    }
}

struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    animation: CubeAnimation,
    fps: FpsCounter,
    next_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new() -> Self {
        App {
            window: None,
            pixels: None,
            animation: CubeAnimation::new(),
            fps: FpsCounter::new(),
            next_frame: Instant::now(),
            error: None,
        }
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let texture = self.animation.texture();
        let (width, height) = (texture.width() as u32, texture.height() as u32);
        let attrs = Window::default_attributes()
            .with_title("ascii_cube")
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        // texture stays at its native size; pixels scales it with nearest filtering
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels =
            Pixels::new(width, height, surface).context("failed to create pixel surface")?;

        self.window = Some(window);
        self.pixels = Some(pixels);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let texture = self.animation.step_textured();
        if let Some(pixels) = self.pixels.as_mut() {
            if !window::blit(texture, pixels.frame_mut()) {
                log::warn!("Texture and surface buffer sizes differ, frame skipped");
            }
            if let Err(e) = pixels.render() {
                log::error!("Failed to present frame: {}", e);
                event_loop.exit();
                return;
            }
        }
        let fps = self.fps.tick();
        if let Some(window) = self.window.as_ref() {
            window.set_title(&format!("ascii_cube - {}", self.animation.status_line(fps)));
        }
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
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(pixels) = self.pixels.as_mut() {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        log::error!("Failed to resize surface: {}", e);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if !self.animation.handle(window::parse_key(key_code)) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame {
            self.next_frame = now + frame_time();
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

fn run_window() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_terminal() -> anyhow::Result<()> {
    let mut terminal = TerminalDisplay::new().context("failed to initialize terminal")?;
    let mut animation = CubeAnimation::new();
    let mut fps = FpsCounter::new();

    loop {
        let frame_start = Instant::now();

        while let Some(key) = terminal.poll_input(Duration::ZERO)? {
            if !animation.handle(parse_key_event(key)) {
                return Ok(());
            }
        }
        terminal.check_resize();

        animation.step();
        let status = animation.status_line(fps.tick());
        if let Err(e) = terminal.render(animation.grid(), &status) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            }
            log::error!("Render error: {}", e);
        }

        if let Some(rest) = frame_time().checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

/// Write `frames` consecutive frames as text plus their glyph textures
fn run_debug(frames: u32, out: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;

    let mut animation = CubeAnimation::new();
    for frame in 0..frames {
        let texture = animation.step_textured();
        let png = out.join(format!("frame_{:03}.png", frame));
        texture.save_png(&png)?;

        let txt = out.join(format!("frame_{:03}.txt", frame));
        std::fs::write(&txt, animation.grid().to_text())
            .with_context(|| format!("failed to write {}", txt.display()))?;
        log::info!("Wrote {} and {}", txt.display(), png.display());
    }

    log::info!("{} debug frames saved to {}", frames, out.display());
    Ok(())
}

/// Stderr logging, or a log file when the terminal view owns the screen
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.terminal.then_some(cli.log_file.as_path()))?;

    if cli.debug {
        return run_debug(cli.frames, &cli.out);
    }
    if cli.terminal {
        run_terminal()?;
        println!("\nThanks for watching the cubes!");
        return Ok(());
    }
    run_window()
}
