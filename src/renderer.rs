use std::borrow::Cow;
use std::time::Instant;
use wgpu::util::DeviceExt;

use crate::config::TextParams;
use crate::error::InitializationError;
use crate::font_atlas::{AtlasSource, FontAtlas};
use crate::layout::{DrawCommand, GlyphLayoutEngine};
use crate::render_style::RenderStyle;
use crate::scheduler::FrameScheduler;
use crate::stats::{FrameStatistics, TimingReport};
use crate::timer_query::{GpuTimerQuery, WgpuTimer};
use crate::utils::{GlyphUniform, Position, QuadVertex, Size, GLYPH_QUAD};

const MSDF_SHADER: &str = include_str!("../shaders/msdf.wgsl");

/// Glyph slots allocated up front; the buffer doubles when a frame needs more.
const INITIAL_GLYPH_CAPACITY: usize = 64;

pub type FrameObserver = Box<dyn FnMut(&FrameStatistics)>;

/// Commands recorded into each frame's encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// Clear-only pass over the target.
    Clear,
    TimerStart,
    /// Text pass loading the cleared target, one draw per glyph.
    Glyphs,
    TimerFinish,
}

/// Recording order of a frame. The timer span brackets the glyph pass only.
pub const FRAME_STEPS: [FrameStep; 4] = [
    FrameStep::Clear,
    FrameStep::TimerStart,
    FrameStep::Glyphs,
    FrameStep::TimerFinish,
];

/// Adapter, device and queue, exclusively owned by one renderer.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Requests a high-performance adapter (able to present to
    /// `compatible_surface` when given) and a device with timestamp queries
    /// enabled where the adapter offers them.
    pub fn new(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, InitializationError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface,
        }))
        .ok_or(InitializationError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "using GPU: {} (vendor {:#06x}, {:?})",
            info.name,
            info.vendor,
            info.backend
        );

        let required_features = adapter.features() & WgpuTimer::REQUIRED_FEATURES;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("MSDF Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

/// One pipeline per [`RenderStyle`], built from the same shader module.
struct StylePipelines {
    basic: wgpu::RenderPipeline,
    smooth: wgpu::RenderPipeline,
    adaptive: wgpu::RenderPipeline,
}

impl StylePipelines {
    fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
    ) -> Self {
        let build = |style: RenderStyle| create_pipeline(device, shader, layout, format, style);
        Self {
            basic: build(RenderStyle::Basic),
            smooth: build(RenderStyle::smooth(0.0)),
            adaptive: build(RenderStyle::Adaptive),
        }
    }

    fn get(&self, style: &RenderStyle) -> &wgpu::RenderPipeline {
        match style {
            RenderStyle::Basic => &self.basic,
            RenderStyle::Smooth { .. } => &self.smooth,
            RenderStyle::Adaptive => &self.adaptive,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    style: RenderStyle,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(style.name()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(style.fragment_entry()),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Per-glyph uniform blocks packed at the device's dynamic-offset alignment.
struct GlyphUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl GlyphUniforms {
    fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glyph_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<GlyphUniform>() as u64,
                    ),
                },
                count: None,
            }],
        })
    }

    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = (std::mem::size_of::<GlyphUniform>() as u64).div_ceil(alignment) * alignment;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glyph Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<GlyphUniform>() as u64),
                }),
            }],
            label: Some("glyph_bind_group"),
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        uniforms: &[GlyphUniform],
    ) {
        if uniforms.is_empty() {
            return;
        }
        if uniforms.len() > self.capacity {
            let capacity = uniforms.len().next_power_of_two();
            log::debug!("growing glyph uniform buffer to {} slots", capacity);
            *self = Self::new(device, layout, capacity);
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * uniforms.len(), 0);
        for (slot, uniform) in self.staging.chunks_exact_mut(stride).zip(uniforms) {
            slot[..std::mem::size_of::<GlyphUniform>()].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }
}

/// Draws the configured text every frame and times each frame on the GPU.
pub struct Renderer {
    gpu: GpuContext,
    atlas: FontAtlas,
    pipelines: StylePipelines,
    quad_buffer: wgpu::Buffer,
    glyph_layout: wgpu::BindGroupLayout,
    glyph_uniforms: GlyphUniforms,
    timer: GpuTimerQuery<WgpuTimer>,
    stats: FrameStatistics,
    scheduler: FrameScheduler,
    observers: Vec<FrameObserver>,
    pub params: TextParams,
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Uploads the atlas and compiles every style's pipeline. Any failure
    /// leaves no renderer behind.
    pub fn new(
        gpu: GpuContext,
        target_format: wgpu::TextureFormat,
        source: AtlasSource,
        params: TextParams,
    ) -> Result<Self, InitializationError> {
        let device = &gpu.device;

        let atlas_layout = FontAtlas::bind_group_layout(device);
        let atlas = FontAtlas::load(device, &gpu.queue, &atlas_layout, source)?;

        let glyph_layout = GlyphUniforms::bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("MSDF Pipeline Layout"),
            bind_group_layouts: &[&atlas_layout, &glyph_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("MSDF Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MSDF_SHADER)),
        });
        let pipelines = StylePipelines::new(device, &shader, &pipeline_layout, target_format);
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            log::error!("MSDF shader rejected: {}", error);
            return Err(InitializationError::ShaderCompilation(error.to_string()));
        }

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Glyph Quad Buffer"),
            contents: bytemuck::cast_slice(&GLYPH_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let glyph_uniforms = GlyphUniforms::new(device, &glyph_layout, INITIAL_GLYPH_CAPACITY);
        let timer = GpuTimerQuery::new(WgpuTimer::new(device, &gpu.queue));

        Ok(Self {
            gpu,
            atlas,
            pipelines,
            quad_buffer,
            glyph_layout,
            glyph_uniforms,
            timer,
            stats: FrameStatistics::new(),
            scheduler: FrameScheduler::new(),
            observers: Vec::new(),
            params,
            clear_color: wgpu::Color {
                r: 1.0,
                g: 0.0,
                b: 1.0,
                a: 1.0,
            },
        })
    }

    /* FRAME LOOP */

    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Whether the next call to [`Renderer::frame`] will draw.
    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.has_request()
    }

    /// Registers an observer called after every frame, in registration order.
    pub fn on_frame_complete<F>(&mut self, observer: F)
    where
        F: FnMut(&FrameStatistics) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Renders into `target` if the loop has a pending frame request.
    /// Returns whether a frame was drawn.
    pub fn frame(&mut self, now: Instant, target: &wgpu::TextureView, surface: Size) -> bool {
        if !self.scheduler.take_request() {
            return false;
        }
        self.render_frame(now, target, surface);
        self.scheduler.rearm();
        true
    }

    /// Draws one frame unconditionally.
    pub fn render_frame(&mut self, now: Instant, target: &wgpu::TextureView, surface: Size) {
        let cpu_start = Instant::now();
        self.stats.begin_frame(now);

        // Lets pending readback mappings complete without blocking.
        self.gpu.device.poll(wgpu::Maintain::Poll);
        if let Some(elapsed) = self.timer.poll() {
            self.stats.record_gpu_time(elapsed);
        }

        let style = self.params.style;
        let style_params = style.uniform_params(self.atlas.meta().distance_range());
        let uniforms: Vec<GlyphUniform> = self
            .layout(surface)
            .iter()
            .map(|command| command.to_uniform(style_params))
            .collect();
        self.glyph_uniforms
            .write(&self.gpu.device, &self.gpu.queue, &self.glyph_layout, &uniforms);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("MSDF Frame Encoder"),
            });

        for step in FRAME_STEPS {
            match step {
                FrameStep::Clear => self.encode_clear(&mut encoder, target),
                FrameStep::TimerStart => self.timer.start(&mut encoder),
                FrameStep::Glyphs => {
                    self.encode_glyphs(&mut encoder, target, &style, uniforms.len())
                }
                FrameStep::TimerFinish => self.timer.finish(&mut encoder),
            }
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        self.stats.end_frame(now, cpu_start.elapsed());
        log::trace!(
            "frame {}: {} glyphs, dt {:.2} ms",
            self.stats.frame_count,
            uniforms.len(),
            self.stats.dt
        );
        for observer in &mut self.observers {
            observer(&self.stats);
        }
    }

    fn encode_clear(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("MSDF Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn encode_glyphs(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        style: &RenderStyle,
        glyph_count: usize,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("MSDF Text Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_pipeline(self.pipelines.get(style));
        rpass.set_bind_group(0, self.atlas.bind_group(), &[]);
        rpass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        for index in 0..glyph_count {
            rpass.set_bind_group(
                1,
                &self.glyph_uniforms.bind_group,
                &[self.glyph_uniforms.offset(index)],
            );
            rpass.draw(0..GLYPH_QUAD.len() as u32, 0..1);
        }
    }

    /// Draw commands for every configured font size, top line first.
    pub fn layout(&self, surface: Size) -> Vec<DrawCommand> {
        GlyphLayoutEngine::new(&self.atlas, surface)
            .layout_stacked(
                &self.params.text,
                &self.params.font_sizes,
                self.params.line_spacing,
                Position::default(),
            )
            .into_iter()
            .flat_map(|run| run.commands)
            .collect()
    }

    /* ACCESSORS */

    pub fn set_style(&mut self, style: RenderStyle) {
        self.params.style = style;
    }

    pub fn stats(&self) -> &FrameStatistics {
        &self.stats
    }

    pub fn report(&self) -> Option<TimingReport> {
        self.stats.report()
    }

    pub fn atlas(&self) -> &FontAtlas {
        &self.atlas
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.gpu.adapter.get_info()
    }

    pub fn timer_supported(&self) -> bool {
        self.timer.backend().is_supported()
    }
}
