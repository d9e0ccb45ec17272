use serde::{Deserialize, Serialize};

/// One corner of the glyph quad, in [0,1]^2. Six of these make the two
/// triangles drawn per glyph.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

pub const GLYPH_QUAD: [QuadVertex; 6] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [0.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
];

/// Per-glyph uniform block. Must match `Glyph` in `shaders/msdf.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct GlyphUniform {
    pub glyph_size: [f32; 2],
    pub glyph_offset: [f32; 2],
    pub glyph_plane: [f32; 4],  // left, bottom, right, top
    pub glyph_bounds: [f32; 4], // left, bottom, right, top in [0,1]
    pub style_params: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Edge-based rectangle as it appears in atlas metrics files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Bounds {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.bottom.is_finite()
            && self.right.is_finite()
            && self.top.is_finite()
    }

    /// Divides horizontal edges by `width` and vertical edges by `height`.
    pub fn normalized(&self, width: f32, height: f32) -> Bounds {
        Bounds {
            left: self.left / width,
            bottom: self.bottom / height,
            right: self.right / width,
            top: self.top / height,
        }
    }

    /// Maps every vertical coordinate `y` to `axis - y`, turning a y-down
    /// rectangle into a y-up one. Edge names are kept.
    pub fn flipped_vertically(&self, axis: f32) -> Bounds {
        Bounds {
            left: self.left,
            bottom: axis - self.bottom,
            right: self.right,
            top: axis - self.top,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}
