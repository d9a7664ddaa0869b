use std::cmp::Ordering;

use isomap_anvil::{Level, RegionInfo};

/// Anything placed on the X/Z grid (regions, chunks).
pub trait Positioned {
    fn position(&self) -> (i32, i32);
}

impl Positioned for RegionInfo {
    fn position(&self) -> (i32, i32) {
        (self.x, self.z)
    }
}

impl Positioned for Level {
    fn position(&self) -> (i32, i32) {
        (self.x, self.z)
    }
}

/// Paint order: Z ascending, then X descending.
pub fn spatial_cmp<T: Positioned + ?Sized>(a: &T, b: &T) -> Ordering {
    let (ax, az) = a.position();
    let (bx, bz) = b.position();
    az.cmp(&bz).then_with(|| bx.cmp(&ax))
}

/// Stable sort into paint order; equal positions keep encounter order.
pub fn sort_spatially<T: Positioned>(items: &mut [T]) {
    items.sort_by(|a, b| spatial_cmp(a, b));
}
