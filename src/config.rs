use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::render_style::RenderStyle;

/// What the renderer draws every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParams {
    pub text: String,
    /// Pixel font sizes; each gets its own baseline, top to bottom.
    pub font_sizes: Vec<f32>,
    /// Baseline step as a multiple of the font size.
    pub line_spacing: f32,
    pub style: RenderStyle,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "abcdefghijklmopq 1234567890".to_string(),
            font_sizes: vec![128.0],
            line_spacing: 1.2,
            style: RenderStyle::Basic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "MSDF Text".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Paths of the metrics/image pair produced by the atlas generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasPaths {
    pub meta: PathBuf,
    pub image: PathBuf,
}

impl Default for AtlasPaths {
    fn default() -> Self {
        Self {
            meta: PathBuf::from("res/sample-font.json"),
            image: PathBuf::from("res/sample-font.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub atlas: AtlasPaths,
    pub text: TextParams,
    /// Linear RGBA.
    pub clear_color: [f64; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            atlas: AtlasPaths::default(),
            text: TextParams::default(),
            clear_color: [1.0, 0.0, 1.0, 1.0],
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}
