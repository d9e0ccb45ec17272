use image::{DynamicImage, RgbaImage};
use std::path::Path;
use wgpu::util::DeviceExt;

use crate::atlas_meta::{FontAtlasMeta, GlyphMetrics, GlyphRecord};
use crate::error::{AtlasError, DataIntegrityError, InitializationError};

/// A metrics table paired with the image it describes.
pub struct AtlasSource {
    meta: FontAtlasMeta,
    image: RgbaImage,
}

impl AtlasSource {
    /// Pairs already-parsed metrics with a decoded image. The image must have
    /// exactly the dimensions the metrics declare.
    pub fn new(meta: FontAtlasMeta, image: DynamicImage) -> Result<Self, AtlasError> {
        let meta = meta.into_validated()?;
        let image = image.to_rgba8();
        let (actual_width, actual_height) = image.dimensions();
        if (actual_width, actual_height) != (meta.atlas.width, meta.atlas.height) {
            return Err(DataIntegrityError::ImageSizeMismatch {
                expected_width: meta.atlas.width,
                expected_height: meta.atlas.height,
                actual_width,
                actual_height,
            }
            .into());
        }
        Ok(Self { meta, image })
    }

    /// Reads the JSON metrics and the PNG image from disk.
    pub fn from_files(
        meta_path: impl AsRef<Path>,
        image_path: impl AsRef<Path>,
    ) -> Result<Self, AtlasError> {
        let meta = FontAtlasMeta::from_path(meta_path)?;
        let image_path = image_path.as_ref();
        let image = image::ImageReader::open(image_path)
            .map_err(|source| AtlasError::Io {
                path: image_path.to_path_buf(),
                source,
            })?
            .decode()?;
        Self::new(meta, image)
    }

    pub fn meta(&self) -> &FontAtlasMeta {
        &self.meta
    }
}

/// GPU-resident MSDF atlas plus its glyph table.
#[allow(dead_code)]
pub struct FontAtlas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    meta: FontAtlasMeta,
}

impl FontAtlas {
    /// Layout of group 0 in the MSDF shader: atlas texture and its sampler.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("font_atlas_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Allocates the atlas texture and queues the pixel upload. The upload is
    /// not waited on; until the GPU executes it the texture samples as zero.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        source: AtlasSource,
    ) -> Result<Self, InitializationError> {
        let AtlasSource { meta, image } = source;
        let (width, height) = image.dimensions();
        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(InitializationError::AtlasTooLarge { width, height, max });
        }

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        // Distances are linear data, never sRGB.
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSDF Atlas Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        Self::upload(device, queue, &texture, &image);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::create_sampler(device);
        let bind_group = Self::create_bind_group(device, &view, &sampler, layout);

        log::info!(
            "font atlas {}x{} queued for upload ({} glyphs, distance range {})",
            width,
            height,
            meta.glyphs.len(),
            meta.atlas.distance_range
        );

        Ok(Self {
            texture,
            view,
            sampler,
            bind_group,
            meta,
        })
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        image: &RgbaImage,
    ) {
        let (width, height) = image.dimensions();
        let bytes_per_pixel = 4;
        let unpadded_bytes_per_row = width as usize * bytes_per_pixel;
        let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(alignment) * alignment;

        let mut padded_buffer = vec![0u8; padded_bytes_per_row * height as usize];
        for (row, pixels) in image.as_raw().chunks(unpadded_bytes_per_row).enumerate() {
            let dst_start = row * padded_bytes_per_row;
            padded_buffer[dst_start..dst_start + unpadded_bytes_per_row].copy_from_slice(pixels);
        }

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Atlas Pixel Buffer"),
            contents: &padded_buffer,
            usage: wgpu::BufferUsages::COPY_SRC,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Atlas Upload Encoder"),
        });
        encoder.copy_buffer_to_texture(
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row as u32),
                    rows_per_image: Some(height),
                },
            },
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MSDF Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("font_atlas_bind_group"),
        })
    }

    pub fn lookup(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.meta.lookup(codepoint)
    }

    pub fn meta(&self) -> &FontAtlasMeta {
        &self.meta
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl GlyphMetrics for FontAtlas {
    fn glyph(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.lookup(codepoint)
    }

    fn atlas_size(&self) -> (f32, f32) {
        self.meta.atlas_size()
    }
}
