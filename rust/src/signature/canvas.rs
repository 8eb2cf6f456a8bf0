//! Fixed-size RGBA raster the pad paints into.

use super::geometry::Point;
use super::SignatureError;

const CHANNELS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(value: &str) -> Result<Self, SignatureError> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| SignatureError::InvalidColor(value.to_string()))?;
        let bytes =
            hex::decode(digits).map_err(|_| SignatureError::InvalidColor(value.to_string()))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            _ => Err(SignatureError::InvalidColor(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 bytes, non-premultiplied.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).all(|px| px[3] == 0)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Reallocates to a new width. Existing pixels are discarded.
    pub fn resize(&mut self, width: u32) {
        *self = Canvas::new(width, self.height);
    }

    /// Paints the segment `from -> to` as a capsule of the given width, which
    /// gives round caps and joins. A zero-length segment paints a dot.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let radius = (width / 2.0).max(0.5);
        let reach = radius + 1.0;

        let min_x = (from.x.min(to.x) - reach).floor().max(0.0);
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0);
        let max_x = (from.x.max(to.x) + reach).ceil().min(self.width as f32 - 1.0);
        let max_y = (from.y.max(to.y) + reach).ceil().min(self.height as f32 - 1.0);
        if max_x < min_x || max_y < min_y {
            return;
        }

        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    // Source-over on straight alpha.
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let i = self.offset(x, y);
        let src_a = coverage * color.a as f32 / 255.0;
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let mix = |src: u8, dst: u8| -> u8 {
            let value = (src as f32 * src_a + dst as f32 * dst_a * (1.0 - src_a)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[i] = mix(color.r, self.pixels[i]);
        self.pixels[i + 1] = mix(color.g, self.pixels[i + 1]);
        self.pixels[i + 2] = mix(color.b, self.pixels[i + 2]);
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
