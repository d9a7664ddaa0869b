//! Chunk record decoding.
//!
//! A record is `[length:u32 BE][scheme:u8][payload:length-1]`. Only the
//! zlib scheme is accepted. Failures are returned per record so the caller
//! can drop one chunk and keep scanning the container.

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use thiserror::Error;

use crate::chunk::{ChunkRoot, Level};

pub const COMPRESSION_GZIP: u8 = 1;
pub const COMPRESSION_ZLIB: u8 = 2;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read record: {0}")]
    Io(#[from] io::Error),
    #[error("record declares zero length")]
    EmptyRecord,
    #[error("unsupported compression scheme {0}")]
    UnsupportedCompression(u8),
    #[error("zlib decompression failed: {0}")]
    Decompress(#[source] io::Error),
    #[error("malformed chunk tag tree: {0}")]
    Nbt(#[from] fastnbt::error::Error),
    #[error("section {y} holds {len} block codes, expected 4096")]
    BadSection { y: i8, len: usize },
    #[error("chunk position {x},{z} is outside the renderable range")]
    PositionOutOfRange { x: i32, z: i32 },
}

/// Decompressed payload of one record.
#[derive(Debug)]
pub struct Inflated {
    /// Declared record length (scheme byte + compressed payload).
    pub compressed_len: u32,
    pub nbt: Vec<u8>,
}

/// Read the record header and inflate its payload.
pub fn inflate_record<R: Read>(mut reader: R) -> Result<Inflated, DecodeError> {
    let length = reader.read_u32::<BigEndian>()?;
    if length == 0 {
        return Err(DecodeError::EmptyRecord);
    }

    let scheme = reader.read_u8()?;
    if scheme != COMPRESSION_ZLIB {
        return Err(DecodeError::UnsupportedCompression(scheme));
    }

    let payload = reader.take(length as u64 - 1);
    let mut nbt = Vec::new();
    ZlibDecoder::new(payload)
        .read_to_end(&mut nbt)
        .map_err(DecodeError::Decompress)?;

    Ok(Inflated {
        compressed_len: length,
        nbt,
    })
}

/// Parse an uncompressed tag tree into a [`Level`].
pub fn decode_level(nbt: &[u8]) -> Result<Level, DecodeError> {
    let root: ChunkRoot = fastnbt::from_bytes(nbt)?;
    Level::try_from(root.level)
}

/// Inflate and parse one record.
pub fn decode_record<R: Read>(reader: R) -> Result<Level, DecodeError> {
    let inflated = inflate_record(reader)?;
    decode_level(&inflated.nbt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Section, SECTION_BLOCKS};
    use crate::writer::{encode_level, wrap_record};
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn sample_level() -> Level {
        let mut blocks = vec![0u8; SECTION_BLOCKS];
        blocks[0] = 1;
        blocks[4095] = 200;
        Level {
            x: -7,
            z: 12,
            last_update: 123_456,
            terrain_populated: Some(1),
            height_map: (0..256).collect(),
            sections: vec![
                Section { y: 0, blocks: blocks.clone(), data: vec![0x5A; 2048] },
                Section { y: 3, blocks, data: Vec::new() },
            ],
        }
    }

    #[test]
    fn test_round_trip_fields() {
        let level = sample_level();
        let record = wrap_record(&encode_level(&level).unwrap()).unwrap();
        let decoded = decode_record(Cursor::new(record)).unwrap();
        assert_eq!(decoded, level);
        assert_eq!(decoded.sections[0].block(0, 0, 0), Some(1));
        assert_eq!(decoded.sections[1].block(15, 15, 15), Some(200));
    }

    #[test]
    fn test_record_padding_is_ignored() {
        let level = sample_level();
        let mut record = wrap_record(&encode_level(&level).unwrap()).unwrap();
        // Sector padding after the declared length
        record.resize(4096 * 2, 0xEE);
        assert_eq!(decode_record(Cursor::new(record)).unwrap(), level);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        #[derive(serde::Serialize)]
        struct Root {
            #[serde(rename = "Level")]
            level: Extra,
            #[serde(rename = "DataVersion")]
            data_version: i32,
        }
        #[derive(serde::Serialize)]
        struct Extra {
            #[serde(rename = "xPos")]
            x_pos: i32,
            #[serde(rename = "zPos")]
            z_pos: i32,
            #[serde(rename = "InhabitedTime")]
            inhabited_time: i64,
            #[serde(rename = "Status")]
            status: String,
        }

        let nbt = fastnbt::to_bytes(&Root {
            level: Extra { x_pos: 4, z_pos: 5, inhabited_time: 99, status: "full".to_string() },
            data_version: 1343,
        })
        .unwrap();
        let level = decode_level(&nbt).unwrap();
        assert_eq!((level.x, level.z), (4, 5));
        assert_eq!(level.terrain_populated, None);
        assert!(level.sections.is_empty());
    }

    #[test]
    fn test_unsupported_compression() {
        let mut record = wrap_record(&encode_level(&sample_level()).unwrap()).unwrap();
        record[4] = COMPRESSION_GZIP;
        assert_matches!(
            decode_record(Cursor::new(record)),
            Err(DecodeError::UnsupportedCompression(1))
        );
    }

    #[test]
    fn test_empty_record() {
        assert_matches!(
            decode_record(Cursor::new(vec![0u8; 4096])),
            Err(DecodeError::EmptyRecord)
        );
    }

    #[test]
    fn test_truncated_header() {
        assert_matches!(decode_record(Cursor::new(vec![0u8, 0])), Err(DecodeError::Io(_)));
    }

    #[test]
    fn test_corrupt_payload() {
        let mut record = wrap_record(&encode_level(&sample_level()).unwrap()).unwrap();
        for byte in record.iter_mut().skip(5) {
            *byte = 0xFF;
        }
        assert_matches!(decode_record(Cursor::new(record)), Err(DecodeError::Decompress(_)));
    }

    #[test]
    fn test_truncated_tag_tree() {
        let nbt = encode_level(&sample_level()).unwrap();
        let record = wrap_record(&nbt[..nbt.len() / 2]).unwrap();
        assert_matches!(decode_record(Cursor::new(record)), Err(DecodeError::Nbt(_)));
    }

    #[test]
    fn test_missing_position_is_malformed() {
        #[derive(serde::Serialize)]
        struct Root {
            #[serde(rename = "Level")]
            level: NoPos,
        }
        #[derive(serde::Serialize)]
        struct NoPos {
            #[serde(rename = "LastUpdate")]
            last_update: i64,
        }
        let nbt = fastnbt::to_bytes(&Root { level: NoPos { last_update: 1 } }).unwrap();
        assert_matches!(decode_level(&nbt), Err(DecodeError::Nbt(_)));
    }

    #[test]
    fn test_position_out_of_range() {
        let mut level = sample_level();
        level.x = i32::MAX;
        let record = wrap_record(&encode_level(&level).unwrap()).unwrap();
        assert_matches!(
            decode_record(Cursor::new(record)),
            Err(DecodeError::PositionOutOfRange { x: i32::MAX, z: 12 })
        );

        level.x = -7;
        level.z = i32::MIN;
        let record = wrap_record(&encode_level(&level).unwrap()).unwrap();
        assert_matches!(
            decode_record(Cursor::new(record)),
            Err(DecodeError::PositionOutOfRange { .. })
        );
    }
}
