//! Isometric rasterizer for decoded chunk levels.
//!
//! Painting is back-to-front (painter's algorithm): regions and chunks are
//! visited in [`position::spatial_cmp`] order and blocks inside a section
//! bottom-up with X descending, so later sprites cover earlier ones.

pub mod canvas;
pub mod colors;
pub mod compositor;
pub mod position;
pub mod projection;

pub use canvas::Canvas;
pub use colors::{BlockColor, BlockPalette, Rgba};
pub use compositor::{draw_block, draw_level};
pub use position::{sort_spatially, spatial_cmp, Positioned};
pub use projection::{chunk_bounds, project, region_bounds, union_all, Rect};
