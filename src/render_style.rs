use serde::{Deserialize, Serialize};

/// Upper bound of the smoothing band, in distance units around the edge.
pub const MAX_SMOOTHNESS: f32 = 0.5;

/// How glyph edges are reconstructed from the distance field. Chosen once
/// per frame; each variant owns a pipeline and fills its own uniform slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderStyle {
    /// Edge width derived from the distance range and on-screen scale.
    #[default]
    Basic,
    /// Fixed smoothstep band of half-width `smoothness` around the edge.
    Smooth { smoothness: f32 },
    /// Edge width from screen-space derivatives of the distance.
    Adaptive,
}

impl RenderStyle {
    pub fn smooth(smoothness: f32) -> Self {
        RenderStyle::Smooth {
            smoothness: smoothness.clamp(0.0, MAX_SMOOTHNESS),
        }
    }

    /// Fragment entry point in `shaders/msdf.wgsl`.
    pub fn fragment_entry(&self) -> &'static str {
        match self {
            RenderStyle::Basic => "fs_basic",
            RenderStyle::Smooth { .. } => "fs_smooth",
            RenderStyle::Adaptive => "fs_adaptive",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderStyle::Basic => "basic",
            RenderStyle::Smooth { .. } => "smooth",
            RenderStyle::Adaptive => "adaptive",
        }
    }

    /// `style_params` slot of the glyph uniform: x = distance range,
    /// y = smoothness.
    pub fn uniform_params(&self, distance_range: f32) -> [f32; 4] {
        let smoothness = match *self {
            RenderStyle::Smooth { smoothness } => smoothness.clamp(0.0, MAX_SMOOTHNESS),
            RenderStyle::Basic | RenderStyle::Adaptive => 0.0,
        };
        [distance_range, smoothness, 0.0, 0.0]
    }
}
