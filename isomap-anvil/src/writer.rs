//! Region container writer.
//!
//! Inverse of the reader: serializes levels to NBT, compresses them with
//! zlib and packs the records into 4KB sectors behind a location table.

use std::io::{self, Write};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::chunk::{ChunkRoot, Level};
use crate::decode::COMPRESSION_ZLIB;
use crate::region::{slot_index, Location, LocationTable, CHUNKS_PER_REGION, HEADER_BYTES, SECTOR_BYTES};

/// Serialize a level to an uncompressed tag tree.
pub fn encode_level(level: &Level) -> Result<Vec<u8>> {
    fastnbt::to_bytes(&ChunkRoot::from(level)).context("Failed to serialize chunk NBT")
}

/// Compress with zlib and frame as `[length:4][type:1][data:N]`.
pub fn wrap_record(nbt: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(nbt)?;
    let compressed = encoder.finish()?;

    let mut record = Vec::with_capacity(5 + compressed.len());
    let total_len = (compressed.len() + 1) as u32;
    record.extend_from_slice(&total_len.to_be_bytes());
    record.push(COMPRESSION_ZLIB);
    record.extend_from_slice(&compressed);
    Ok(record)
}

/// Builds a region container in memory.
pub struct RegionWriter {
    table: LocationTable,
    sectors: Vec<u8>,
}

impl RegionWriter {
    pub fn new() -> Self {
        Self {
            table: LocationTable::empty(),
            sectors: Vec::new(),
        }
    }

    /// Store a level in the slot for its region-relative position.
    pub fn push_level(&mut self, level: &Level, timestamp: u32) -> Result<Location> {
        let record = wrap_record(&encode_level(level)?)?;
        self.push_record(slot_index(level.x, level.z), &record, timestamp)
    }

    /// Store pre-framed record bytes in `slot`, padded to whole sectors.
    pub fn push_record(&mut self, slot: usize, record: &[u8], timestamp: u32) -> Result<Location> {
        if slot >= CHUNKS_PER_REGION {
            anyhow::bail!("Slot {} is outside the location table", slot);
        }
        let sector_count = (record.len() as u64).div_ceil(SECTOR_BYTES).max(1);
        let sectors = u8::try_from(sector_count)
            .with_context(|| format!("Record for slot {} needs {} sectors", slot, sector_count))?;

        // Sectors 0-1 are the header itself
        let offset = (HEADER_BYTES + self.sectors.len() as u64) / SECTOR_BYTES;
        let location = Location::new(offset as u32, sectors);

        self.sectors.extend_from_slice(record);
        let padded = (offset + sector_count) * SECTOR_BYTES - HEADER_BYTES;
        self.sectors.resize(padded as usize, 0);

        self.table.set(slot, location, timestamp);
        Ok(location)
    }

    pub fn table(&self) -> &LocationTable {
        &self.table
    }

    pub fn finish(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_BYTES as usize + self.sectors.len());
        // Writing into a Vec cannot fail
        let _ = self.table.write(&mut bytes);
        bytes.extend_from_slice(&self.sectors);
        bytes
    }
}

impl Default for RegionWriter {
    fn default() -> Self {
        Self::new()
    }
}
