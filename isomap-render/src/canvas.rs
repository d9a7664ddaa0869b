//! RGBA target image with a signed pixel origin.
//!
//! Pixels are stored premultiplied, row-major, 4 bytes each. Writes outside
//! the bounds are clipped.

use crate::colors::Rgba;
use crate::projection::Rect;

const M: u64 = 0xffff;

#[derive(Debug, Clone)]
pub struct Canvas {
    bounds: Rect,
    pix: Vec<u8>,
}

impl Canvas {
    /// Transparent canvas covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        let len = bounds.width().max(0) as usize * bounds.height().max(0) as usize * 4;
        Self {
            bounds,
            pix: vec![0; len],
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn width(&self) -> u32 {
        self.bounds.width().max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.bounds.height().max(0) as u32
    }

    /// Raw premultiplied RGBA bytes, top row first.
    pub fn as_raw(&self) -> &[u8] {
        &self.pix
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let row = (y - self.bounds.min_y) as usize;
        let col = (x - self.bounds.min_x) as usize;
        Some((row * self.bounds.width() as usize + col) * 4)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        let p = &self.pix[i..i + 4];
        Some(Rgba(p[0], p[1], p[2], p[3]))
    }

    /// Overwrite one pixel.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.pix[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Porter-Duff "over" with a uniform mask, in 16-bit precision.
    ///
    /// `out = src * mask + dst * (1 - src_alpha * mask)`
    pub fn blend_over(&mut self, x: i32, y: i32, src: Rgba, mask: u8) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        let ma = mask as u64 * 0x101;
        let sa = src.3 as u64 * 0x101;
        let a = (M - sa * ma / M) * 0x101;

        for (c, s) in src.to_array().into_iter().enumerate() {
            let d = self.pix[i + c] as u64;
            let s = s as u64 * 0x101;
            self.pix[i + c] = ((d * a + s * ma) / M >> 8) as u8;
        }
    }

    /// Copy of the area shared by `rect` and this canvas.
    pub fn crop(&self, rect: Rect) -> Canvas {
        let area = self.bounds.intersect(rect);
        let mut out = Canvas::new(area);
        if area.is_empty() {
            return out;
        }

        let row_bytes = area.width() as usize * 4;
        for y in area.min_y..area.max_y {
            // Both offsets exist: `area` lies inside both canvases
            if let (Some(src), Some(dst)) = (self.offset(area.min_x, y), out.offset(area.min_x, y)) {
                out.pix[dst..dst + row_bytes].copy_from_slice(&self.pix[src..src + row_bytes]);
            }
        }
        out
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        let mut out = self.pix.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3] as u64;
            if a == 0 || a == 0xff {
                continue;
            }
            let a16 = a * 0x101;
            for c in &mut px[..3] {
                *c = ((*c as u64 * 0x101 * M / a16) >> 8) as u8;
            }
        }
        out
    }
}
