//! Isometric world renderer.
//!
//! Regions are discovered on disk, decoded one at a time on the blocking
//! pool and handed to a single render consumer that paints them back to
//! front into one canvas.

pub mod discover;
pub mod output;
pub mod pipeline;

pub use discover::discover_regions;
pub use output::write_png;
pub use pipeline::{decode_region, produce, render_regions, Batch, Rendered};
