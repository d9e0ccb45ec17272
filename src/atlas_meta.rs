//! Metrics table of a pre-baked MSDF atlas.
//!
//! The JSON layout is the one emitted by `msdf-atlas-gen`:
//!
//! ```json
//! {
//!   "atlas": { "type": "msdf", "distanceRange": 4, "size": 48,
//!              "width": 256, "height": 256, "yOrigin": "bottom" },
//!   "metrics": { "emSize": 1, "lineHeight": 1.2, ... },
//!   "glyphs": [ { "unicode": 65, "advance": 0.6,
//!                 "planeBounds": { "left": 0, "bottom": 0, "right": 0.5, "top": 0.7 },
//!                 "atlasBounds": { "left": 0, "bottom": 0, "right": 24, "top": 34 } } ]
//! }
//! ```
//!
//! After loading, every rectangle is expressed with a bottom origin
//! regardless of the `yOrigin` the file declares.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{AtlasError, DataIntegrityError};
use crate::utils::Bounds;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum YOrigin {
    #[default]
    Bottom,
    Top,
    /// Any other value; rejected by [`FontAtlasMeta::validate`].
    Unknown(String),
}

impl From<String> for YOrigin {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "bottom" => YOrigin::Bottom,
            "top" => YOrigin::Top,
            _ => YOrigin::Unknown(raw),
        }
    }
}

impl From<YOrigin> for String {
    fn from(origin: YOrigin) -> Self {
        match origin {
            YOrigin::Bottom => "bottom".to_string(),
            YOrigin::Top => "top".to_string(),
            YOrigin::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasInfo {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub distance_range: f32,
    /// Pixels per em the atlas was generated at.
    #[serde(default)]
    pub size: f32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub y_origin: YOrigin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontMetrics {
    pub em_size: f32,
    pub line_height: f32,
    pub ascender: f32,
    pub descender: f32,
    pub underline_y: f32,
    pub underline_thickness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphRecord {
    #[serde(rename = "unicode")]
    pub codepoint: u32,
    #[serde(rename = "advance")]
    pub advance_width: f32,
    #[serde(default)]
    pub plane_bounds: Option<Bounds>,
    #[serde(default)]
    pub atlas_bounds: Option<Bounds>,
}

impl GlyphRecord {
    /// Plane and atlas rectangles, only when the glyph has both.
    pub fn visual_bounds(&self) -> Option<(Bounds, Bounds)> {
        match (self.plane_bounds, self.atlas_bounds) {
            (Some(plane), Some(atlas)) => Some((plane, atlas)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontAtlasMeta {
    pub atlas: AtlasInfo,
    #[serde(default)]
    pub metrics: Option<FontMetrics>,
    pub glyphs: Vec<GlyphRecord>,
}

/// Read access to a glyph table, independent of where the texture lives.
pub trait GlyphMetrics {
    fn glyph(&self, codepoint: u32) -> Option<&GlyphRecord>;

    /// Atlas size in texels, used to normalize atlas bounds.
    fn atlas_size(&self) -> (f32, f32);
}

impl FontAtlasMeta {
    /// Parses, validates and normalizes a metrics document.
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        let meta: FontAtlasMeta = serde_json::from_str(json)?;
        Ok(meta.into_validated()?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| AtlasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks the table and converts it to bottom origin.
    pub fn into_validated(self) -> Result<Self, DataIntegrityError> {
        self.validate()?;
        Ok(self.into_bottom_origin())
    }

    pub fn validate(&self) -> Result<(), DataIntegrityError> {
        let AtlasInfo {
            width,
            height,
            distance_range,
            ..
        } = self.atlas;
        if width == 0 || height == 0 {
            return Err(DataIntegrityError::EmptyAtlas { width, height });
        }
        if !(distance_range.is_finite() && distance_range > 0.0) {
            return Err(DataIntegrityError::InvalidDistanceRange(distance_range));
        }
        if let YOrigin::Unknown(raw) = &self.atlas.y_origin {
            return Err(DataIntegrityError::UnknownYOrigin(raw.clone()));
        }

        let mut seen = HashSet::with_capacity(self.glyphs.len());
        for glyph in &self.glyphs {
            if !seen.insert(glyph.codepoint) {
                return Err(DataIntegrityError::DuplicateCodepoint(glyph.codepoint));
            }
            if let Some(plane) = glyph.plane_bounds {
                if !plane.is_finite() {
                    return Err(DataIntegrityError::InvertedBounds {
                        codepoint: glyph.codepoint,
                    });
                }
            }
            if let Some(bounds) = glyph.atlas_bounds {
                self.check_atlas_bounds(glyph.codepoint, bounds)?;
            }
        }
        Ok(())
    }

    fn check_atlas_bounds(&self, codepoint: u32, bounds: Bounds) -> Result<(), DataIntegrityError> {
        // Vertical edges are ordered by the declared origin.
        let (low, high) = match self.atlas.y_origin {
            YOrigin::Bottom | YOrigin::Unknown(_) => (bounds.bottom, bounds.top),
            YOrigin::Top => (bounds.top, bounds.bottom),
        };
        if !bounds.is_finite() || bounds.left > bounds.right || low > high {
            return Err(DataIntegrityError::InvertedBounds { codepoint });
        }
        let (width, height) = (self.atlas.width as f32, self.atlas.height as f32);
        if bounds.left < 0.0 || low < 0.0 || bounds.right > width || high > height {
            return Err(DataIntegrityError::GlyphOutsideAtlas {
                codepoint,
                width: self.atlas.width,
                height: self.atlas.height,
            });
        }
        Ok(())
    }

    fn into_bottom_origin(mut self) -> Self {
        if self.atlas.y_origin == YOrigin::Top {
            let height = self.atlas.height as f32;
            for glyph in &mut self.glyphs {
                glyph.plane_bounds = glyph.plane_bounds.map(|b| b.flipped_vertically(0.0));
                glyph.atlas_bounds = glyph.atlas_bounds.map(|b| b.flipped_vertically(height));
            }
            self.atlas.y_origin = YOrigin::Bottom;
        }
        self
    }

    /// First glyph with the given code point.
    pub fn lookup(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.glyphs.iter().find(|glyph| glyph.codepoint == codepoint)
    }

    pub fn distance_range(&self) -> f32 {
        self.atlas.distance_range
    }
}

impl GlyphMetrics for FontAtlasMeta {
    fn glyph(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.lookup(codepoint)
    }

    fn atlas_size(&self) -> (f32, f32) {
        (self.atlas.width as f32, self.atlas.height as f32)
    }
}
