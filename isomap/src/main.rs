use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use isomap::{discover_regions, render_regions, write_png};
use isomap_benchmark::RenderMetrics;
use isomap_render::BlockPalette;

#[derive(Parser)]
#[command(name = "isomap", about = "Isometric PNG renderer for region-based worlds")]
pub struct Args {
    /// World directory; containers are read from <dir>/region/*.mca
    #[arg(short, long, env = "ISOMAP_WORLD", default_value = "world")]
    pub dir: PathBuf,

    /// Output PNG
    #[arg(short, long, env = "ISOMAP_OUT", default_value = "map.png")]
    pub out: PathBuf,

    /// Block color table (JSON)
    #[arg(short, long, env = "ISOMAP_COLORS", default_value = "blocks.json")]
    pub colors: PathBuf,

    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    // Colors first: a bad table aborts before any region is touched
    let palette = BlockPalette::load(&args.colors)?;
    let regions = discover_regions(&args.dir)?;

    let metrics = Arc::new(RenderMetrics::new(format!(
        "world={}, colors={}, regions={}",
        args.dir.display(),
        args.colors.display(),
        regions.len()
    )));

    let rendered = render_regions(regions, &palette, Arc::clone(&metrics)).await?;
    let image = rendered.cropped()?;
    log::info!(
        "Rendered {} chunks ({} blocks) into {}x{}",
        rendered.chunks,
        rendered.blocks,
        image.width(),
        image.height()
    );

    write_png(&image, &args.out)?;

    println!("{}", metrics.generate_report());
    Ok(())
}
