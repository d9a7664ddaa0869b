use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use isomap_render::Canvas;

/// Encode the canvas as an 8-bit RGBA PNG.
pub fn write_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output image {}", path.display()))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), canvas.width(), canvas.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("Failed to write PNG header to {}", path.display()))?;
    writer
        .write_image_data(&canvas.to_straight_alpha())
        .with_context(|| format!("Failed to write PNG data to {}", path.display()))?;
    writer
        .finish()
        .with_context(|| format!("Failed to finish PNG {}", path.display()))?;

    log::info!("Wrote {}x{} image to {}", canvas.width(), canvas.height(), path.display());
    Ok(())
}
