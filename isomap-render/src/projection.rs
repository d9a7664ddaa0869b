//! Isometric projection and pixel-space bounding rectangles.
//!
//! One block step in X moves the sprite 2 pixels right and 1 up, a step in
//! Z moves it 2 right and 1 down, and a step in Y lifts it 2 pixels.

use isomap_anvil::{Level, RegionInfo};

/// Block coordinates to the sprite anchor pixel.
#[inline]
pub fn project(x: i32, y: i32, z: i32) -> (i32, i32) {
    ((x << 1) + (z << 1), z - x - (y << 1))
}

/// Half-open pixel rectangle `[min, max)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    /// Corners may be given in any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Smallest rectangle enclosing both. Empty rectangles are ignored.
    pub fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn intersect(self, other: Rect) -> Rect {
        let r = Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if r.is_empty() { Rect::default() } else { r }
    }
}

/// Union-accumulate, starting from the first rectangle.
pub fn union_all<I: IntoIterator<Item = Rect>>(rects: I) -> Option<Rect> {
    rects.into_iter().reduce(Rect::union)
}

/// Pixel area a whole region can paint into (assumes at most 256 blocks tall).
///
/// Coordinates must lie within `±MAX_REGION_COORD`, as parsed names do.
pub fn region_bounds(region: &RegionInfo) -> Rect {
    // Region extents in blocks: 32 chunks * 16 = 512 = 1 << 9
    let (xr0, zr0) = (region.x << 9, region.z << 9);
    let (xr1, zr1) = ((region.x + 1) << 9, (region.z + 1) << 9);

    let (x0, y0) = ((xr0 << 1) + (zr0 << 1), -xr0 + zr1);
    let (x1, y1) = ((xr1 << 1) + (zr1 << 1), -xr1 - 512 + zr0);
    Rect::new(x0 - 2, y0 + 2, x1 - 2, y1)
}

/// Pixel area one chunk paints into, up to its highest section + 16 blocks.
///
/// Coordinates must lie within `±MAX_CHUNK_COORD`, as decoded levels do.
pub fn chunk_bounds(level: &Level) -> Rect {
    let top = level.top_y();
    let (cx, cz) = (level.x, level.z);

    let (x0, y0) = ((cx << 5) + (cz << 5), -(cx << 4) + ((cz + 1) << 4));
    let (x1, y1) = (((cx + 1) << 5) + ((cz + 1) << 5), -((cx + 1) << 4) - (top << 1) + (cz << 4));
    Rect::new(x0 - 2, y0 + 2, x1 - 2, y1)
}
