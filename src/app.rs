use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::ViewerConfig;
use crate::error::InitializationError;
use crate::font_atlas::AtlasSource;
use crate::render_style::RenderStyle;
use crate::renderer::{GpuContext, Renderer};
use crate::utils::Size;

/// Frames between periodic statistics log lines.
const STATS_LOG_INTERVAL: u64 = 120;

/// Smoothness used when the `2` key selects the smooth style.
const DEFAULT_SMOOTHNESS: f32 = 0.1;

struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
}

impl ViewerState {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &ViewerConfig,
        source: AtlasSource,
    ) -> anyhow::Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title(&config.window.title)
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(InitializationError::from)?;
        let gpu = GpuContext::new(&instance, Some(&surface))?;

        let size = window.inner_size();
        let surface_config = surface
            .get_default_config(&gpu.adapter, size.width.max(1), size.height.max(1))
            .ok_or(InitializationError::IncompatibleSurface)?;
        surface.configure(&gpu.device, &surface_config);

        let mut renderer = Renderer::new(gpu, surface_config.format, source, config.text.clone())?;
        renderer.clear_color = config.clear_color();
        renderer.on_frame_complete(|stats| {
            if stats.frame_count % STATS_LOG_INTERVAL == 0 {
                log::info!(
                    "fps {:.1}, dt {:.2} ms, cpu {:.2} ms, gpu {}",
                    stats.fps,
                    stats.dt,
                    stats.frame_time,
                    stats
                        .render_time
                        .map(|ms| format!("{:.3} ms", ms))
                        .unwrap_or_else(|| "unknown".to_string())
                );
            }
        });
        renderer.start();

        Ok(Self {
            window,
            surface,
            surface_config,
            renderer,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface
            .configure(&self.renderer.gpu().device, &self.surface_config);
    }

    fn redraw(&mut self) {
        // Paused: leave the last presented image on screen.
        if !self.renderer.has_pending_frame() {
            return;
        }
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface
                    .configure(&self.renderer.gpu().device, &self.surface_config);
                self.window.request_redraw();
                return;
            }
            Err(err) => {
                log::warn!("skipping frame: {}", err);
                self.window.request_redraw();
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = Size::new(
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        );

        self.renderer.frame(Instant::now(), &view, size);
        self.window.pre_present_notify();
        frame.present();

        if self.renderer.is_running() {
            self.window.request_redraw();
        }
    }

    fn handle_key(&mut self, key: &Key) {
        match key {
            Key::Named(NamedKey::Space) => {
                if self.renderer.is_running() {
                    self.renderer.stop();
                } else {
                    self.renderer.start();
                    self.window.request_redraw();
                }
            }
            Key::Character(c) => match c.as_str() {
                "1" => self.renderer.set_style(RenderStyle::Basic),
                "2" => self.renderer.set_style(RenderStyle::smooth(DEFAULT_SMOOTHNESS)),
                "3" => self.renderer.set_style(RenderStyle::Adaptive),
                "r" | "R" => match self.renderer.report() {
                    Some(report) => log::info!("GPU timings\n{}", report),
                    None => log::info!("no GPU timings collected yet"),
                },
                _ => {}
            },
            _ => {}
        }
    }
}

/// winit host for the renderer: owns the window and its surface, forwards
/// redraws, resizes and key presses.
pub struct ViewerApp {
    config: ViewerConfig,
    source: Option<AtlasSource>,
    state: Option<ViewerState>,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig, source: AtlasSource) -> Self {
        Self {
            config,
            source: Some(source),
            state: None,
            error: None,
        }
    }

    pub fn renderer(&mut self) -> Option<&mut Renderer> {
        self.state.as_mut().map(|state| &mut state.renderer)
    }

    /// Initialization failure that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }
}

impl ApplicationHandler<()> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(source) = self.source.take() else {
            return;
        };
        match ViewerState::new(event_loop, &self.config, source) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("failed to initialize renderer: {:#}", err);
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    state.handle_key(&event.logical_key);
                }
            }
            WindowEvent::RedrawRequested => state.redraw(),
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::CloseRequested => {
                state.renderer.stop();
                event_loop.exit();
            }
            _ => (),
        }
    }
}

/// Loads the atlas named by `config`, opens a window and runs until it is
/// closed.
pub fn run_viewer(config: ViewerConfig) -> anyhow::Result<()> {
    let source = AtlasSource::from_files(&config.atlas.meta, &config.atlas.image)?;
    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(config, source);

    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
