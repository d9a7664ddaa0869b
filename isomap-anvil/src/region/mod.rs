// Region containers: 8KB header, then 4KB sectors of chunk records.

mod header;

pub use header::{Location, LocationTable};

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chunk::MAX_CHUNK_COORD;

pub const SECTOR_BYTES: u64 = 4096; // minecraft uses 4096 bytes per sector
pub const HEADER_BYTES: u64 = 8192; // header is 8192 bytes (2 sectors 8kb)

pub const REGION_CHUNKS: i32 = 32; // chunks per region side
pub const CHUNKS_PER_REGION: usize = 1024;

/// Largest region coordinate magnitude, matching `MAX_CHUNK_COORD`.
pub const MAX_REGION_COORD: i32 = MAX_CHUNK_COORD >> 5;

/// Table slot for region-relative chunk coordinates.
pub fn slot_index(rel_x: i32, rel_z: i32) -> usize {
    // 32x32 chunks in region. index from 0 to 1023.
    // Formula: x + z * 32
    ((rel_x & 31) + (rel_z & 31) * 32) as usize
}

pub fn slot_coords(slot: usize) -> Option<(i32, i32)> {
    if slot >= CHUNKS_PER_REGION {
        return None;
    }
    Some(((slot % 32) as i32, (slot / 32) as i32))
}

/// Region coordinates from a `r.X.Z.mca` file name.
///
/// Parsing stops at the first field that is not an integer within
/// `±MAX_REGION_COORD`; fields not reached stay 0, so a malformed name
/// yields (0, 0).
pub fn parse_region_name(name: &str) -> (i32, i32) {
    let mut coords = [0i32; 2];
    if let Some(rest) = name.strip_prefix("r.") {
        let mut fields = rest.split('.');
        for slot in coords.iter_mut() {
            let value = fields
                .next()
                .and_then(|f| f.parse::<i32>().ok())
                .filter(|v| v.unsigned_abs() <= MAX_REGION_COORD as u32);
            match value {
                Some(value) => *slot = value,
                None => break,
            }
        }
    }
    (coords[0], coords[1])
}

/// A region container on disk, identified by its file name coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub x: i32,
    pub z: i32,
    pub path: PathBuf,
}

impl RegionInfo {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (x, z) = parse_region_name(name);
        if name != format!("r.{}.{}.mca", x, z) {
            log::warn!("Region name {:?} does not match r.X.Z.mca, placing at {},{}", name, x, z);
        }
        Self { x, z, path }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn open(&self) -> Result<Region<File>> {
        open_region(&self.path)
    }
}

pub fn open_region(path: &Path) -> Result<Region<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open region file {}", path.display()))?;
    Region::from_stream(file)
        .with_context(|| format!("Failed to read region header of {}", path.display()))
}

/// Open container: parsed header plus a seekable stream for record access.
pub struct Region<S> {
    table: LocationTable,
    stream: RefCell<S>,
}

impl<S: Read + Seek> Region<S> {
    pub fn from_stream(mut stream: S) -> io::Result<Self> {
        stream.seek(SeekFrom::Start(0))?;
        let table = LocationTable::read(&mut stream)?;
        Ok(Self {
            table,
            stream: RefCell::new(stream),
        })
    }

    pub fn table(&self) -> &LocationTable {
        &self.table
    }

    /// Bounded view over `[offset * 4096, (offset + sectors) * 4096)`.
    ///
    /// Each view keeps its own position and seeks before every read, so
    /// several views can be open and read in any order without buffering
    /// the whole file.
    pub fn record(&self, location: Location) -> io::Result<RecordView<'_, S>> {
        self.stream
            .borrow_mut()
            .seek(SeekFrom::Start(location.byte_offset()))?;
        Ok(RecordView {
            stream: &self.stream,
            start: location.byte_offset(),
            len: location.byte_len(),
            pos: 0,
        })
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

/// Read-only window onto one record's sectors.
pub struct RecordView<'a, S> {
    stream: &'a RefCell<S>,
    start: u64,
    len: u64,
    pos: u64,
}

impl<S: Read + Seek> Read for RecordView<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = (self.len - self.pos).min(buf.len() as u64) as usize;
        if want == 0 {
            return Ok(0);
        }
        let mut stream = self.stream.borrow_mut();
        stream.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = stream.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_slot_index_0_0() {
        assert_eq!(slot_index(0, 0), 0);
    }

    #[test]
    fn test_slot_index_wraps_negative() {
        // Region-relative math uses the low 5 bits, as absolute coords do
        assert_eq!(slot_index(-1, 0), 31);
        assert_eq!(slot_index(0, 1), 32);
        assert_eq!(slot_index(33, -1), 1 + 31 * 32);
    }

    #[test]
    fn test_slot_round_trip() {
        for z in 0..32 {
            for x in 0..32 {
                let slot = slot_index(x, z);
                assert_eq!(slot_coords(slot), Some((x, z)));
            }
        }
        assert_eq!(slot_coords(1024), None);
    }

    #[test]
    fn test_parse_region_name() {
        assert_eq!(parse_region_name("r.0.0.mca"), (0, 0));
        assert_eq!(parse_region_name("r.-3.12.mca"), (-3, 12));
        assert_eq!(parse_region_name("r.5.x.mca"), (5, 0));
        assert_eq!(parse_region_name("r.524288.-524288.mca"), (524288, -524288));
        assert_eq!(parse_region_name("r.-3.524289.mca"), (-3, 0));
        assert_eq!(parse_region_name("r.4194304.0.mca"), (0, 0));
        assert_eq!(parse_region_name("level.dat"), (0, 0));
        assert_eq!(parse_region_name(""), (0, 0));
    }

    #[test]
    fn test_region_info_from_path() {
        let info = RegionInfo::from_path("/world/region/r.-1.2.mca");
        assert_eq!((info.x, info.z), (-1, 2));
        assert_eq!(info.file_name(), "r.-1.2.mca");
    }

    fn container_with_marked_sectors() -> Vec<u8> {
        let mut table = LocationTable::empty();
        assert!(table.set(0, Location::new(2, 1), 0));
        assert!(table.set(1, Location::new(3, 2), 0));
        let mut bytes = Vec::new();
        table.write(&mut bytes).unwrap();
        // Sector n is filled with byte n so views can be checked
        for sector in 2u8..5 {
            bytes.extend(std::iter::repeat(sector).take(SECTOR_BYTES as usize));
        }
        bytes
    }

    #[test]
    fn test_record_view_bounds() {
        let region = Region::from_stream(Cursor::new(container_with_marked_sectors())).unwrap();

        // Pull the second record first: order must not matter
        let location = region.table().location(1).unwrap();
        let mut bytes = Vec::new();
        region.record(location).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 2 * 4096);
        assert!(bytes[..4096].iter().all(|&b| b == 3));
        assert!(bytes[4096..].iter().all(|&b| b == 4));

        let location = region.table().location(0).unwrap();
        let mut bytes = Vec::new();
        region.record(location).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4096);
        assert!(bytes.iter().all(|&b| b == 2));
    }

    #[test]
    fn test_record_view_past_end_is_short() {
        let region = Region::from_stream(Cursor::new(container_with_marked_sectors())).unwrap();
        let mut bytes = Vec::new();
        region.record(Location::new(4, 3)).unwrap().read_to_end(&mut bytes).unwrap();
        // Only one sector exists past offset 4
        assert_eq!(bytes.len(), 4096);
    }

    #[test]
    fn test_record_views_are_independent() {
        let region = Region::from_stream(Cursor::new(container_with_marked_sectors())).unwrap();
        let mut first = region.record(Location::new(2, 1)).unwrap();
        let mut second = region.record(Location::new(3, 2)).unwrap();

        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        first.read_exact(&mut a).unwrap();
        second.read_exact(&mut b).unwrap();
        assert_eq!(a, [2; 16]);
        assert_eq!(b, [3; 16]);

        // Interleaved reads resume where each view left off
        let mut rest = Vec::new();
        first.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 4096 - 16);
        assert!(rest.iter().all(|&v| v == 2));

        let mut rest = Vec::new();
        second.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 2 * 4096 - 16);
        assert!(rest[..4096 - 16].iter().all(|&v| v == 3));
        assert!(rest[4096 - 16..].iter().all(|&v| v == 4));
    }

    #[test]
    fn test_out_of_range_region_name() {
        let info = RegionInfo::from_path("/world/region/r.4194304.0.mca");
        assert_eq!((info.x, info.z), (0, 0));
        assert!(info.x.unsigned_abs() <= MAX_REGION_COORD as u32);
    }
}
