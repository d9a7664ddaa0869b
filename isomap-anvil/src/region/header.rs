//! Region file header.
//!
//! The header consists of two tables:
//! - Location table: where each chunk record is stored
//! - Timestamp table: when each chunk was last saved

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{CHUNKS_PER_REGION, HEADER_BYTES, SECTOR_BYTES};

/// One location table entry.
///
/// Stored on disk as a big-endian word: top 24 bits sector offset,
/// low 8 bits sector count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub offset: u32,
    pub sectors: u8,
}

impl Location {
    pub fn new(offset: u32, sectors: u8) -> Self {
        Self { offset, sectors }
    }

    pub fn from_word(word: u32) -> Self {
        Self {
            offset: word >> 8,
            sectors: (word & 0xFF) as u8,
        }
    }

    pub fn to_word(self) -> u32 {
        ((self.offset & 0x00FF_FFFF) << 8) | self.sectors as u32
    }

    /// A zero sector count marks an empty slot.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.sectors == 0
    }

    #[inline]
    pub fn byte_offset(self) -> u64 {
        self.offset as u64 * SECTOR_BYTES
    }

    #[inline]
    pub fn byte_len(self) -> u64 {
        self.sectors as u64 * SECTOR_BYTES
    }
}

/// Parsed 8KB header (location table + timestamp table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTable {
    locations: Vec<Location>,
    timestamps: Vec<u32>,
}

impl LocationTable {
    /// Table with every slot empty.
    pub fn empty() -> Self {
        Self {
            locations: vec![Location::default(); CHUNKS_PER_REGION],
            timestamps: vec![0; CHUNKS_PER_REGION],
        }
    }

    /// Read the full header. A short header surfaces as `UnexpectedEof`.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut header = vec![0u8; HEADER_BYTES as usize];
        reader.read_exact(&mut header)?;

        let mut cursor = &header[..];
        let mut locations = Vec::with_capacity(CHUNKS_PER_REGION);
        for _ in 0..CHUNKS_PER_REGION {
            locations.push(Location::from_word(cursor.read_u32::<BigEndian>()?));
        }
        let mut timestamps = Vec::with_capacity(CHUNKS_PER_REGION);
        for _ in 0..CHUNKS_PER_REGION {
            timestamps.push(cursor.read_u32::<BigEndian>()?);
        }

        Ok(Self { locations, timestamps })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for location in &self.locations {
            writer.write_u32::<BigEndian>(location.to_word())?;
        }
        for timestamp in &self.timestamps {
            writer.write_u32::<BigEndian>(*timestamp)?;
        }
        Ok(())
    }

    /// `None` when `slot` is outside the 1024-entry table.
    pub fn location(&self, slot: usize) -> Option<Location> {
        self.locations.get(slot).copied()
    }

    pub fn timestamp(&self, slot: usize) -> Option<u32> {
        self.timestamps.get(slot).copied()
    }

    /// Returns false, leaving the table untouched, when `slot` is out of range.
    pub fn set(&mut self, slot: usize, location: Location, timestamp: u32) -> bool {
        match (self.locations.get_mut(slot), self.timestamps.get_mut(slot)) {
            (Some(l), Some(t)) => {
                *l = location;
                *t = timestamp;
                true
            }
            _ => false,
        }
    }

    /// Non-empty slots in table order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Location)> + '_ {
        self.locations
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, location)| !location.is_empty())
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_size() {
        let mut bytes = Vec::new();
        LocationTable::empty().write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 8192);
    }

    #[test]
    fn test_location_word_unpack() {
        let location = Location::from_word(0x0000_0203);
        assert_eq!(location.offset, 2);
        assert_eq!(location.sectors, 3);
        assert_eq!(location.byte_offset(), 8192);
        assert_eq!(location.byte_len(), 3 * 4096);

        let high = Location::from_word(0xABCD_EF01);
        assert_eq!(high.offset, 0x00AB_CDEF);
        assert_eq!(high.sectors, 1);
        assert_eq!(high.to_word(), 0xABCD_EF01);
    }

    #[test]
    fn test_read_entries_big_endian() {
        let mut bytes = vec![0u8; 8192];
        // Slot 0: sector 2, 1 sector
        bytes[0..4].copy_from_slice(&[0, 0, 2, 1]);
        // Slot 5: sector 0x010203, 4 sectors
        bytes[20..24].copy_from_slice(&[1, 2, 3, 4]);
        // Timestamp for slot 5
        bytes[4096 + 20..4096 + 24].copy_from_slice(&[0, 0, 1, 0]);

        let table = LocationTable::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(table.location(0), Some(Location::new(2, 1)));
        assert_eq!(table.location(5), Some(Location::new(0x010203, 4)));
        assert_eq!(table.timestamp(5), Some(256));
        assert_eq!(table.timestamp(0), Some(0));
    }

    #[test]
    fn test_occupied_skips_empty_slots() {
        let mut table = LocationTable::empty();
        assert_eq!(table.occupied().count(), 0);

        table.set(3, Location::new(2, 1), 0);
        table.set(700, Location::new(3, 2), 0);
        // Offset without a length is still empty
        table.set(900, Location::new(9, 0), 0);

        let occupied: Vec<_> = table.occupied().collect();
        assert_eq!(occupied, vec![(3, Location::new(2, 1)), (700, Location::new(3, 2))]);
    }

    #[test]
    fn test_short_header_is_io_error() {
        let err = LocationTable::read(&mut Cursor::new(vec![0u8; 100])).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_write_read_preserves_entries() {
        let mut table = LocationTable::empty();
        table.set(1023, Location::new(40, 2), 1_700_000_000);
        let mut bytes = Vec::new();
        table.write(&mut bytes).unwrap();
        assert_eq!(&bytes[4092..4096], &[0, 0, 40, 2]);
        assert_eq!(LocationTable::read(&mut Cursor::new(bytes)).unwrap(), table);
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut table = LocationTable::empty();
        assert_eq!(table.location(1024), None);
        assert_eq!(table.timestamp(usize::MAX), None);
        assert!(!table.set(1024, Location::new(2, 1), 7));
        assert_eq!(table, LocationTable::empty());
        assert!(table.set(1023, Location::new(2, 1), 7));
        assert_eq!(table.timestamp(1023), Some(7));
    }
}
