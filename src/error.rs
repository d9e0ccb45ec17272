use std::path::PathBuf;
use thiserror::Error;

/// Inconsistencies between an atlas image and its metrics table, or inside
/// the metrics table itself. Raised once, at load time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataIntegrityError {
    #[error("atlas dimensions must be non-zero, got {width}x{height}")]
    EmptyAtlas { width: u32, height: u32 },

    #[error("distance range must be a positive number, got {0}")]
    InvalidDistanceRange(f32),

    #[error("code point U+{0:04X} appears more than once in the glyph table")]
    DuplicateCodepoint(u32),

    #[error("glyph U+{codepoint:04X} has inverted or non-finite bounds")]
    InvertedBounds { codepoint: u32 },

    #[error("glyph U+{codepoint:04X} references a region outside the {width}x{height} atlas")]
    GlyphOutsideAtlas {
        codepoint: u32,
        width: u32,
        height: u32,
    },

    #[error("atlas image is {actual_width}x{actual_height} but metrics describe {expected_width}x{expected_height}")]
    ImageSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("unsupported yOrigin '{0}'")]
    UnknownYOrigin(String),
}

/// Failures while reading the metrics/image pair from disk or memory.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed atlas metrics: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to decode atlas image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

/// Fatal construction failures. A renderer is either fully usable or not
/// constructed at all.
#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    IncompatibleSurface,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("shader program failed to compile: {0}")]
    ShaderCompilation(String),

    #[error("atlas texture {width}x{height} exceeds the device limit of {max}")]
    AtlasTooLarge { width: u32, height: u32, max: u32 },

    #[error("font atlas could not be loaded: {0}")]
    Atlas(#[from] AtlasError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}
