//! Renders the configured text offscreen for a fixed number of frames and
//! prints the GPU timing report.
//!
//! Usage: `timing_bench [config.json] [frames] [report.txt]`

use anyhow::{bail, Context};
use msdf_text_bench::utils::Size;
use msdf_text_bench::{AtlasSource, GpuContext, Renderer, ViewerConfig};
use std::fs;
use std::time::Instant;

const DEFAULT_FRAMES: u32 = 600;
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn create_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("bench-target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            ViewerConfig::load(&path).with_context(|| format!("loading config {}", path))?
        }
        None => ViewerConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid frame count '{}'", raw))?,
        None => DEFAULT_FRAMES,
    };
    let report_path = args.next();

    let source = AtlasSource::from_files(&config.atlas.meta, &config.atlas.image)
        .context("loading font atlas")?;
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let gpu = GpuContext::new(&instance, None)?;

    let (width, height) = (config.window.width, config.window.height);
    let target = create_target(&gpu.device, width, height);
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let size = Size::new(width as f32, height as f32);

    let mut renderer = Renderer::new(gpu, TARGET_FORMAT, source, config.text.clone())?;
    renderer.clear_color = config.clear_color();
    if !renderer.timer_supported() {
        bail!(
            "{} does not support timestamp queries inside encoders",
            renderer.adapter_info().name
        );
    }

    renderer.start();
    for _ in 0..frames {
        renderer.frame(Instant::now(), &view, size);
        renderer.gpu().device.poll(wgpu::Maintain::Wait);
    }
    renderer.stop();

    let stats = renderer.stats();
    log::info!(
        "{} frames, {} GPU samples in window",
        stats.frame_count,
        stats.sample_count()
    );
    let Some(report) = renderer.report() else {
        bail!("no GPU timings were collected");
    };
    println!("{}", report);

    if let Some(path) = report_path {
        fs::write(&path, format!("{}\n", report))
            .with_context(|| format!("writing report to {}", path))?;
        log::info!("report written to {}", path);
    }
    Ok(())
}
