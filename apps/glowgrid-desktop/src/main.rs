use anyhow::{Context, Result};
use clap::Parser;
use glowgrid_animator::{FrameHandle, FrameHost, FrameLoop, SceneAnimator, SystemClock};
use glowgrid_common::Viewport;
use glowgrid_input::InputEvent;
use glowgrid_render_wgpu::WgpuRenderer;
use glowgrid_scene::SceneConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "glowgrid-desktop", about = "Glow grid desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Frame host backed by winit redraw requests.
///
/// winit has no per-request handles, so the host remembers the one it armed
/// and hands it back on the next `RedrawRequested`.
struct WindowFrameHost {
    window: Arc<Window>,
    next: u64,
    armed: Option<FrameHandle>,
}

impl WindowFrameHost {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next: 0,
            armed: None,
        }
    }

    fn take_armed(&mut self) -> Option<FrameHandle> {
        self.armed.take()
    }
}

impl FrameHost for WindowFrameHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.armed = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.armed == Some(handle) {
            self.armed = None;
        }
    }
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

struct GlowApp {
    scene_config: SceneConfig,
    initial_size: LogicalSize<u32>,
    animator: SceneAnimator,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    host: Option<WindowFrameHost>,
    frame_loop: FrameLoop,
}

impl GlowApp {
    fn new(scene_config: SceneConfig, initial_size: LogicalSize<u32>) -> Result<Self> {
        let viewport = Viewport::new(initial_size.width as f32, initial_size.height as f32);
        let animator = SceneAnimator::new(&scene_config, viewport, 1.0, SystemClock::new())?;
        Ok(Self {
            scene_config,
            initial_size,
            animator,
            window: None,
            gpu: None,
            host: None,
            frame_loop: FrameLoop::new(),
        })
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Glow Grid")
            .with_inner_size(self.initial_size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

        // Sync the animator with the real logical size and pixel ratio first;
        // the renderer sizes its targets from the drawing buffer.
        let scale = window.scale_factor();
        let size = window.inner_size();
        let logical = size.to_logical::<f32>(scale);
        self.animator.handle_input(&InputEvent::Resized {
            viewport: Viewport::new(logical.width.max(1.0), logical.height.max(1.0)),
            device_pixel_ratio: scale as f32,
        });

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glowgrid_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            self.animator.scene(),
            self.animator.drawing_buffer().physical_size(),
            self.scene_config.renderer.msaa_samples,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.host = Some(WindowFrameHost::new(window.clone()));
        self.window = Some(window);
        self.gpu = Some(Gpu {
            surface,
            device,
            queue,
            config,
            renderer,
        });
        Ok(())
    }

    fn apply_resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        if size.width == 0 || size.height == 0 {
            tracing::debug!("skipping zero-size resize");
            return;
        }
        let logical = size.to_logical::<f32>(scale);
        self.animator.handle_input(&InputEvent::Resized {
            viewport: Viewport::new(logical.width, logical.height),
            device_pixel_ratio: scale as f32,
        });

        if let Some(gpu) = &mut self.gpu {
            gpu.config.width = size.width;
            gpu.config.height = size.height;
            gpu.surface.configure(&gpu.device, &gpu.config);
            gpu.renderer
                .resize(&gpu.device, self.animator.drawing_buffer().physical_size());
        }
    }

    fn redraw(&mut self) {
        let accepted = self
            .host
            .as_mut()
            .and_then(WindowFrameHost::take_armed)
            .is_some_and(|handle| self.frame_loop.begin_frame(handle));
        if accepted {
            self.animator.tick();
        }

        if let Some(gpu) = &self.gpu {
            let output = match gpu.surface.get_current_texture() {
                Ok(t) => Some(t),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    None
                }
                Err(e) => {
                    tracing::error!("surface error: {e}");
                    None
                }
            };

            if let Some(output) = output {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                gpu.renderer
                    .render(&gpu.device, &gpu.queue, &view, self.animator.scene());
                output.present();
            }
        }

        if let Some(host) = &mut self.host {
            self.frame_loop.rearm(host);
        }
    }
}

impl ApplicationHandler for GlowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
            return;
        }
        if let Some(host) = &mut self.host {
            self.frame_loop.start(host);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(host) = &mut self.host {
                    self.frame_loop.cancel(host);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.apply_resize(new_size, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.apply_resize(size, scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                let logical = position.to_logical::<f32>(scale);
                self.animator.handle_input(&InputEvent::PointerMoved {
                    client_x: logical.x,
                    client_y: logical.y,
                });
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("glowgrid-desktop starting");

    let scene_config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GlowApp::new(scene_config, LogicalSize::new(cli.width, cli.height))?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
