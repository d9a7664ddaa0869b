//! Two-stage decode/render pipeline.
//!
//! A producer on the blocking pool decodes one region at a time and hands
//! its sorted chunks to the render consumer over a channel of capacity 1.
//! The producer only starts a region once the consumer has taken the
//! previous batch, so at most one region is decoded while the one before
//! it is painted. Only the consumer touches the canvas.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use isomap_anvil::{decode_level, inflate_record, DecodeError, Level, RegionInfo};
use isomap_benchmark::RenderMetrics;
use isomap_render::{
    chunk_bounds, draw_level, region_bounds, sort_spatially, union_all, BlockPalette, Canvas, Rect,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Sorted, populated chunks of one region.
#[derive(Debug)]
pub struct Batch {
    pub source: RegionInfo,
    /// Position of the region in paint order, from 0.
    pub index: usize,
    pub total: usize,
    pub chunks: Vec<Level>,
}

impl Batch {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Decode every occupied slot of a region.
///
/// Failing to open or seek the container is fatal. A record that fails to
/// inflate or parse is logged, counted and skipped. Chunks whose terrain is
/// not populated are left out. The result is in paint order.
pub fn decode_region(region: &RegionInfo, metrics: &RenderMetrics) -> Result<Vec<Level>> {
    let container = region.open()?;
    metrics.record_region();

    let slots: Vec<_> = container.table().occupied().collect();
    let mut levels = Vec::with_capacity(slots.len());

    for (slot, location) in slots {
        let started = Instant::now();
        let record = container.record(location).with_context(|| {
            format!("Failed to seek to slot {} in {}", slot, region.path.display())
        })?;

        let decoded = inflate_record(record).and_then(|inflated| {
            metrics.record_chunk_sizes(inflated.nbt.len(), inflated.compressed_len as usize);
            decode_level(&inflated.nbt)
        });

        match decoded {
            Ok(level) => {
                metrics.record_decode(started.elapsed());
                if level.is_populated() {
                    levels.push(level);
                } else {
                    metrics.record_unpopulated();
                }
            }
            Err(e) => {
                drop_chunk(region, slot, &e);
                metrics.record_dropped();
            }
        }
    }

    sort_spatially(&mut levels);
    Ok(levels)
}

fn drop_chunk(region: &RegionInfo, slot: usize, err: &DecodeError) {
    log::warn!("Skipping chunk in slot {} of {}: {}", slot, region.file_name(), err);
}

/// Producer stage: decode regions in paint order and send one batch each.
///
/// Must run off the async workers (`spawn_blocking`). Before decoding a
/// region it waits on `handle` for the channel slot, which frees up only
/// when the consumer has taken the previous batch.
pub fn produce(
    mut regions: Vec<RegionInfo>,
    tx: mpsc::Sender<Batch>,
    metrics: &RenderMetrics,
    handle: &Handle,
) -> Result<()> {
    sort_spatially(&mut regions);
    let total = regions.len();

    for (index, source) in regions.into_iter().enumerate() {
        let Ok(permit) = handle.block_on(tx.reserve()) else {
            anyhow::bail!("Render stage stopped before all regions were decoded");
        };

        log::info!("Parsing: {} ({}/{})", source.file_name(), index + 1, total);
        let chunks = decode_region(&source, metrics)?;
        log::info!("Found {} populated chunks", chunks.len());

        permit.send(Batch { source, index, total, chunks });
    }
    Ok(())
}

/// Result of a full render pass.
#[derive(Debug)]
pub struct Rendered {
    /// Canvas covering every input region.
    pub canvas: Canvas,
    /// Union of the bounds of every rendered chunk.
    pub bounds: Option<Rect>,
    pub chunks: usize,
    pub blocks: usize,
}

impl Rendered {
    /// The canvas cropped to what was actually painted.
    pub fn cropped(&self) -> Result<Canvas> {
        let bounds = self
            .bounds
            .context("Nothing rendered: no populated chunks were found")?;
        Ok(self.canvas.crop(bounds))
    }
}

/// Decode and paint `regions` back to front.
pub async fn render_regions(
    regions: Vec<RegionInfo>,
    palette: &BlockPalette,
    metrics: Arc<RenderMetrics>,
) -> Result<Rendered> {
    let area = union_all(regions.iter().map(region_bounds)).context("No region files to render")?;
    let mut canvas = Canvas::new(area);
    log::debug!("Canvas {}x{} at ({}, {})", canvas.width(), canvas.height(), area.min_x, area.min_y);

    let (tx, mut rx) = mpsc::channel::<Batch>(1);
    let producer = {
        let metrics = Arc::clone(&metrics);
        let handle = Handle::current();
        tokio::task::spawn_blocking(move || produce(regions, tx, &metrics, &handle))
    };

    let mut bounds: Option<Rect> = None;
    let (mut chunks, mut blocks) = (0, 0);

    while let Some(batch) = rx.recv().await {
        let count = batch.chunk_count();
        for (i, level) in batch.chunks.iter().enumerate() {
            let started = Instant::now();
            let painted = draw_level(&mut canvas, level, palette);
            metrics.record_render(started.elapsed());
            metrics.record_chunk_rendered(painted);

            let area = chunk_bounds(level);
            bounds = Some(bounds.map_or(area, |b| b.union(area)));
            chunks += 1;
            blocks += painted;

            log::debug!(
                "{}: {:.1}%",
                batch.source.file_name(),
                (i + 1) as f64 * 100.0 / count as f64
            );
        }
    }

    // Producer errors surface once the channel is drained
    producer.await.context("Region decoder task failed")??;

    Ok(Rendered { canvas, bounds, chunks, blocks })
}
