//! Glyph layout.
//!
//! Positions are in surface units: `x` runs from 0 at the left edge to 1 at
//! the right edge, `y` from 0 at the top to 1 at the bottom. A pen position
//! is the baseline origin of the next glyph.

use crate::atlas_meta::GlyphMetrics;
use crate::utils::{Bounds, GlyphUniform, Position, Size};

/// Pen advance of U+0020, in ems. Applied regardless of any space glyph in
/// the atlas.
pub const SPACE_ADVANCE: f32 = 0.5;

const SPACE: char = ' ';

/// One visible glyph, ready to be bound and drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Font size divided by the surface width and height.
    pub size_in_units: Size,
    /// Baseline origin of the glyph.
    pub pen_offset: Position,
    /// Quad in glyph-local units (unit font size, y up).
    pub plane: Bounds,
    /// Sample rectangle, normalized to [0,1] with a bottom origin.
    pub atlas_rect: Bounds,
}

impl DrawCommand {
    pub fn to_uniform(&self, style_params: [f32; 4]) -> GlyphUniform {
        GlyphUniform {
            glyph_size: [self.size_in_units.width, self.size_in_units.height],
            glyph_offset: [self.pen_offset.x, self.pen_offset.y],
            glyph_plane: self.plane.to_array(),
            glyph_bounds: self.atlas_rect.to_array(),
            style_params,
        }
    }
}

/// Result of laying out one run of text on one baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub commands: Vec<DrawCommand>,
    /// Pen position after the last character, for chaining runs.
    pub pen: Position,
}

pub struct GlyphLayoutEngine<'a, M: GlyphMetrics + ?Sized> {
    metrics: &'a M,
    surface: Size,
}

impl<'a, M: GlyphMetrics + ?Sized> GlyphLayoutEngine<'a, M> {
    pub fn new(metrics: &'a M, surface: Size) -> Self {
        Self { metrics, surface }
    }

    /// Font size expressed as a fraction of the surface's width and height.
    pub fn size_in_units(&self, font_size: f32) -> Size {
        Size {
            width: font_size / self.surface.width,
            height: font_size / self.surface.height,
        }
    }

    /// Lays out `text` on a single baseline starting at `pen`.
    ///
    /// Characters without a glyph are skipped without moving the pen;
    /// glyphs without bounds (whitespace other than U+0020) only advance it.
    pub fn layout(&self, text: &str, font_size: f32, pen: Position) -> TextLayout {
        if self.surface.is_empty() {
            return TextLayout {
                commands: Vec::new(),
                pen,
            };
        }

        let units = self.size_in_units(font_size);
        let (atlas_width, atlas_height) = self.metrics.atlas_size();
        let mut commands = Vec::with_capacity(text.len());
        let mut pen = pen;

        for c in text.chars() {
            if c == SPACE {
                pen.x += units.width * SPACE_ADVANCE;
                continue;
            }

            let Some(glyph) = self.metrics.glyph(c as u32) else {
                log::trace!("no glyph for U+{:04X}, skipping", c as u32);
                continue;
            };

            if let Some((plane, atlas)) = glyph.visual_bounds() {
                commands.push(DrawCommand {
                    size_in_units: units,
                    pen_offset: pen,
                    plane,
                    atlas_rect: atlas.normalized(atlas_width, atlas_height),
                });
            }
            pen.x += units.width * glyph.advance_width;
        }

        TextLayout { commands, pen }
    }

    /// Lays out the same text once per font size, each on its own baseline.
    /// Before every run the vertical offset grows by the run's font height
    /// times `line_spacing`.
    pub fn layout_stacked(
        &self,
        text: &str,
        font_sizes: &[f32],
        line_spacing: f32,
        origin: Position,
    ) -> Vec<TextLayout> {
        let mut offset_y = origin.y;
        font_sizes
            .iter()
            .map(|&font_size| {
                offset_y += self.size_in_units(font_size).height * line_spacing;
                self.layout(text, font_size, Position::new(origin.x, offset_y))
            })
            .collect()
    }

    /// Horizontal advance of `text`, in surface units.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.layout(text, font_size, Position::default()).pen.x
    }
}
