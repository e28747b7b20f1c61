//=========================================================================
// Quad
//=========================================================================
//
// Screen-space rectangle and its conversion to GPU vertices.
//
// Quads are authored in pixels with a top-left origin. Conversion maps
// them into normalized device coordinates (x right, y up, -1..1) as a
// four-vertex triangle strip:
//
//   0 ─── 1        0: upper-left   1: upper-right
//   │   ╱ │        2: lower-left   3: lower-right
//   2 ─── 3
//
//=========================================================================

//=== Quad ================================================================

/// Axis-aligned draw primitive.
///
/// `color` is packed `0xRRGGBBAA`. Texture coordinates select the region
/// of the bound texture, `(0,0)` to `(1,1)` being the whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: u32,
    pub upper_left_s: f32,
    pub upper_left_t: f32,
    pub lower_right_s: f32,
    pub lower_right_t: f32,
}

impl Quad {
    /// Opaque white quad covering the whole texture.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: 0xFFFF_FFFF,
            upper_left_s: 0.0,
            upper_left_t: 0.0,
            lower_right_s: 1.0,
            lower_right_t: 1.0,
        }
    }

    /// Untextured rectangle in a flat color.
    pub fn solid(x: i32, y: i32, width: i32, height: i32, color: u32) -> Self {
        Self::new(x, y, width, height).with_color(color)
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Selects a sub-rectangle of the texture (sprite sheets, tiles).
    pub fn with_tex_coords(mut self, upper_left: (f32, f32), lower_right: (f32, f32)) -> Self {
        (self.upper_left_s, self.upper_left_t) = upper_left;
        (self.lower_right_s, self.lower_right_t) = lower_right;
        self
    }

    /// Converts to triangle-strip vertices for a surface of the given size.
    pub fn to_vertices(&self, screen_width: u32, screen_height: u32) -> [Vertex; 4] {
        let sw = screen_width as f32;
        let sh = screen_height as f32;

        let left = (self.x as f32 / sw) * 2.0 - 1.0;
        let top = 1.0 - (self.y as f32 / sh) * 2.0;
        let right = left + (self.width as f32 / sw) * 2.0;
        let bottom = top - (self.height as f32 / sh) * 2.0;
        let color = rgba_to_abgr(self.color);

        let vertex = |x, y, s, t| Vertex { x, y, color, s, t };
        [
            vertex(left, top, self.upper_left_s, self.upper_left_t),
            vertex(right, top, self.lower_right_s, self.upper_left_t),
            vertex(left, bottom, self.upper_left_s, self.lower_right_t),
            vertex(right, bottom, self.lower_right_s, self.lower_right_t),
        ]
    }
}

//=== Vertex ==============================================================

/// One corner of a converted quad.
///
/// `color` is `0xAABBGGRR`, which lays the bytes out as R, G, B, A in
/// little-endian memory for a normalized `u8 × 4` vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub color: u32,
    pub s: f32,
    pub t: f32,
}

/// Reverses byte order: `0xRRGGBBAA` → `0xAABBGGRR`.
pub fn rgba_to_abgr(color: u32) -> u32 {
    ((color & 0x0000_00FF) << 24)
        | ((color & 0x0000_FF00) << 8)
        | ((color & 0x00FF_0000) >> 8)
        | ((color & 0xFF00_0000) >> 24)
}

//=========================================================================
// Unit Tests
//=========================================================================
