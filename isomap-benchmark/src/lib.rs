use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by the decode and render stages.
#[derive(Debug, Default)]
pub struct RenderMetrics {
    // Decode Stats
    pub total_regions_opened: AtomicUsize,
    pub total_records_read: AtomicUsize,
    pub total_chunks_decoded: AtomicUsize,
    pub total_chunks_dropped: AtomicUsize,
    pub total_chunks_unpopulated: AtomicUsize,
    pub total_decode_time_us: AtomicU64,
    pub max_decode_time_us: AtomicU64,

    pub total_bytes_compressed: AtomicUsize,
    pub total_bytes_raw: AtomicUsize,

    // Render Stats
    pub total_chunks_rendered: AtomicUsize,
    pub total_blocks_painted: AtomicUsize,
    pub total_render_time_us: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
    pub config_summary: String,
}

impl RenderMetrics {
    pub fn new(config_summary: String) -> Self {
        Self {
            start_time: Some(Instant::now()),
            config_summary,
            ..Default::default()
        }
    }

    pub fn record_region(&self) {
        self.total_regions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode(&self, duration: Duration) {
        self.total_records_read.fetch_add(1, Ordering::Relaxed);
        self.total_chunks_decoded.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_decode_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_decode_time_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.total_records_read.fetch_add(1, Ordering::Relaxed);
        self.total_chunks_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unpopulated(&self) {
        self.total_chunks_unpopulated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_sizes(&self, raw: usize, compressed: usize) {
        self.total_bytes_raw.fetch_add(raw, Ordering::Relaxed);
        self.total_bytes_compressed.fetch_add(compressed, Ordering::Relaxed);
    }

    pub fn record_chunk_rendered(&self, blocks: usize) {
        self.total_chunks_rendered.fetch_add(1, Ordering::Relaxed);
        self.total_blocks_painted.fetch_add(blocks, Ordering::Relaxed);
    }

    pub fn record_render(&self, duration: Duration) {
        self.total_render_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn chunks_dropped(&self) -> usize {
        self.total_chunks_dropped.load(Ordering::Relaxed)
    }

    pub fn chunks_rendered(&self) -> usize {
        self.total_chunks_rendered.load(Ordering::Relaxed)
    }

    pub fn chunks_unpopulated(&self) -> usize {
        self.total_chunks_unpopulated.load(Ordering::Relaxed)
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();
        let regions = self.total_regions_opened.load(Ordering::Relaxed);
        let records = self.total_records_read.load(Ordering::Relaxed);
        let decoded = self.total_chunks_decoded.load(Ordering::Relaxed);
        let dropped = self.chunks_dropped();
        let unpopulated = self.chunks_unpopulated();

        let decode_time = self.total_decode_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let decode_max = self.max_decode_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let decode_avg = if decoded > 0 { decode_time / decoded as f64 } else { 0.0 };

        let raw = self.total_bytes_raw.load(Ordering::Relaxed);
        let compressed = self.total_bytes_compressed.load(Ordering::Relaxed);
        let compression_ratio = if compressed > 0 { raw as f64 / compressed as f64 } else { 0.0 };

        let rendered = self.chunks_rendered();
        let blocks = self.total_blocks_painted.load(Ordering::Relaxed);
        let render_time = self.total_render_time_us.load(Ordering::Relaxed) as f64 / 1000.0;
        let render_avg = if rendered > 0 { render_time / rendered as f64 } else { 0.0 };

        format!(
            "isomap Render Report\n\
             ====================\n\
             Configuration: {}\n\
             Session Duration: {:.2?}\n\n\
             [Decode]\n\
             Regions: {}\n\
             Records Read: {}\n\
             Chunks Decoded: {}\n\
             Chunks Dropped: {}\n\
             Chunks Unpopulated: {}\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\
             Compression Ratio: {:.2}x ({:.1} KB -> {:.1} KB)\n\n\
             [Render]\n\
             Chunks Rendered: {}\n\
             Blocks Painted: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/chunk\n",
            self.config_summary,
            uptime,
            regions, records, decoded, dropped, unpopulated,
            decode_avg, decode_max,
            compression_ratio, compressed as f64 / 1024.0, raw as f64 / 1024.0,
            rendered, blocks, render_time, render_avg,
        )
    }
}
